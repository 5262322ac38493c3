// gotype core - Go type extraction for boilerplate generation
//
// Parses Go packages with tree-sitter, resolves struct field and interface
// signature types across package boundaries and hands a deduplicated type
// model to code generators.

pub mod config;
pub mod error;
pub mod extractors;
pub mod language;
pub mod locator;
pub mod module_map;
pub mod registry;
pub mod resolve;
pub mod utils;

pub use config::ExtractorConfig;
pub use error::{Diagnostic, ExtractError, Result, UnsupportedReason, UnsupportedTypeExpression};
pub use extractors::base::{
    Arg, Field, Import, InterfaceDecl, Method, NamedType, StructDecl, TypeBody, TypeId, TypeKey,
    TypeShape,
};
pub use extractors::{Extraction, ExtractorManager, FileSummary};
pub use module_map::{ModuleDescriptor, ModuleMap, PackageDescriptor};
pub use registry::{NamedEntry, TypeDescriptor, TypeRegistry};
pub use resolve::{resolve_type_expr, FileScope, ImportSpec, TypeExpr};

/// Extract everything reachable from `roots` with the default configuration.
pub fn extract_files<P: AsRef<std::path::Path>>(
    roots: impl IntoIterator<Item = P>,
) -> Result<Extraction> {
    let mut manager = ExtractorManager::new(ExtractorConfig::default())?;
    manager.extract(roots)?;
    Ok(manager.into_extraction())
}
