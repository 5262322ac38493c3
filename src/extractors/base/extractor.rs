// BaseExtractor implementation
//
// Holds the source text of one compilation unit and the node-level helpers
// every Go extraction pass needs (node text, doc comments).

use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Per-file state shared by the extraction passes
pub struct BaseExtractor {
    pub language: String,
    pub file_path: PathBuf,
    pub content: String,
}

impl BaseExtractor {
    pub fn new(language: String, file_path: &Path, content: String) -> Self {
        Self {
            language,
            file_path: file_path.to_path_buf(),
            content,
        }
    }

    /// Get text from a tree-sitter node
    pub fn get_node_text(&self, node: &Node) -> String {
        let start_byte = node.start_byte();
        let end_byte = node.end_byte();

        // Use byte slice but handle UTF-8 boundaries properly
        let content_bytes = self.content.as_bytes();
        if start_byte < content_bytes.len() && end_byte <= content_bytes.len() {
            String::from_utf8_lossy(&content_bytes[start_byte..end_byte]).to_string()
        } else {
            String::new()
        }
    }

    /// Find the `//` comment block directly above a node.
    ///
    /// Only comments that end on the line right before the node (or right
    /// before the previously collected comment) count, so a comment separated
    /// by a blank line is not attached.
    pub fn find_doc_comment(&self, node: &Node) -> Option<String> {
        let mut comments = Vec::new();
        let mut expected_row = node.start_position().row;

        let mut current = node.prev_sibling();
        while let Some(sibling) = current {
            if sibling.kind() != "comment" || sibling.end_position().row + 1 != expected_row {
                break;
            }
            let text = self.get_node_text(&sibling);
            if !text.trim_start().starts_with("//") {
                break;
            }
            comments.push(text);
            expected_row = sibling.start_position().row;
            current = sibling.prev_sibling();
        }

        if comments.is_empty() {
            return None;
        }

        // Reverse to get source order (top to bottom)
        comments.reverse();
        Some(
            comments
                .iter()
                .map(|c| c.trim_start_matches("//").trim())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}
