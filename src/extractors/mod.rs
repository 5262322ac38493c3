//! Declaration extractors
//!
//! Tree-sitter based extraction of Go type declarations and the run driver
//! that stitches per-file results into one cross-package model.
//!
//! # Architecture
//!
//! - `base` - shared data model and node helpers
//! - `go` - Go declaration extractor (structs, interfaces, imports)
//! - `manager.rs` - ExtractorManager public API (one run, recursive resolution)

pub mod base;
pub mod go;
pub mod manager;

// Re-export the public API
pub use go::{FileDeclarations, GoExtractor};
pub use manager::{Extraction, ExtractorManager, FileSummary};
