// Tree navigation methods for BaseExtractor

use super::extractor::BaseExtractor;
use tree_sitter::Node;

impl BaseExtractor {
    /// First ERROR or MISSING node in document order, if any.
    pub fn find_first_error<'a>(&self, node: &Node<'a>) -> Option<Node<'a>> {
        if !node.has_error() {
            return None;
        }
        if node.is_error() || node.is_missing() {
            return Some(*node);
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
        children
            .iter()
            .find_map(|child| self.find_first_error(child))
            // has_error() with no offending descendant: report the node itself
            .or(Some(*node))
    }

    /// Named children of a given kind, skipping comments and punctuation
    pub fn get_children_of_type<'a>(&self, node: &Node<'a>, child_type: &str) -> Vec<Node<'a>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() == child_type)
            .collect()
    }

    /// Get field text safely
    pub fn get_field_text(&self, node: &Node, field_name: &str) -> Option<String> {
        node.child_by_field_name(field_name)
            .map(|field| self.get_node_text(&field))
    }

    /// All nodes bound to `field_name`, e.g. every `name` of `a, b int`.
    pub fn get_field_nodes<'a>(&self, node: &Node<'a>, field_name: &str) -> Vec<Node<'a>> {
        let mut cursor = node.walk();
        node.children_by_field_name(field_name, &mut cursor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(source: &str) -> (BaseExtractor, tree_sitter::Tree) {
        let mut parser = crate::language::new_parser("go").unwrap();
        let tree = parser.parse(source, None).unwrap();
        let base = BaseExtractor::new("go".to_string(), Path::new("t.go"), source.to_string());
        (base, tree)
    }

    #[test]
    fn test_find_first_error_points_at_broken_line() {
        let (base, tree) = parse("package p\n\ntype A struct {\n\tX int\n}\n\ntype B struct {{\n");
        let error = base.find_first_error(&tree.root_node()).unwrap();
        assert!(error.start_position().row >= 6);
    }

    #[test]
    fn test_clean_tree_has_no_error() {
        let (base, tree) = parse("package p\n\ntype A struct{ X int }\n");
        assert!(base.find_first_error(&tree.root_node()).is_none());
    }

    #[test]
    fn test_doc_comment_requires_adjacent_lines() {
        let source = "package p\n\n// detached\n\n// Order is a purchase.\n// It has items.\ntype Order struct{}\n";
        let (base, tree) = parse(source);
        let root = tree.root_node();
        let decl = base.get_children_of_type(&root, "type_declaration")[0];
        assert_eq!(
            base.find_doc_comment(&decl).as_deref(),
            Some("Order is a purchase.\nIt has items.")
        );
    }
}
