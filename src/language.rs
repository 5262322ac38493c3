//! Language Support - tree-sitter grammar configuration
//!
//! Grammar loading and compilation-unit detection live here so the extractors
//! and the run driver never touch grammar crates directly.

use anyhow::Result;
use std::path::Path;
use tree_sitter::Parser;

/// Languages this crate can parse.
pub const SUPPORTED_LANGUAGES: &[&str] = &["go"];

/// Get tree-sitter language parser for a given language name
///
/// This is the SINGLE SOURCE OF TRUTH for grammar selection.
pub fn get_tree_sitter_language(language: &str) -> Result<tree_sitter::Language> {
    match language {
        "go" => Ok(tree_sitter_go::LANGUAGE.into()),
        _ => Err(anyhow::anyhow!(
            "Unsupported language: '{}'. Supported languages: {}",
            language,
            SUPPORTED_LANGUAGES.join(", ")
        )),
    }
}

/// Detect language from file extension
///
/// Returns the language name that can be passed to `get_tree_sitter_language()`.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "go" => Some("go"),
        _ => None,
    }
}

/// Whether `path` is a Go compilation unit.
///
/// `_test.go` files only count when `include_tests` is set; they frequently
/// declare an external `_test` package that must not be merged into the
/// package under extraction.
pub fn is_go_source(path: &Path, include_tests: bool) -> bool {
    let is_go = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(detect_language_from_extension)
        == Some("go");
    if !is_go {
        return false;
    }

    let is_test = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"));

    include_tests || !is_test
}

/// Build a parser with the Go grammar already loaded.
pub fn new_parser(language: &str) -> Result<Parser> {
    let mut parser = Parser::new();
    let ts_language = get_tree_sitter_language(language)?;
    parser.set_language(&ts_language).map_err(|e| {
        anyhow::anyhow!("Failed to set parser language for {}: {}", language, e)
    })?;
    Ok(parser)
}
