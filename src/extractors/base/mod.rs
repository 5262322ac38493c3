// Base Extractor Types
//
// - types.rs: data model (type keys, shapes, struct/interface declarations, imports)
// - extractor.rs: BaseExtractor (source text, node text, doc comments)
// - tree_methods.rs: tree navigation helpers

pub mod extractor;
pub mod tree_methods;
pub mod types;

// Re-export key types for external use
pub use extractor::BaseExtractor;
pub use types::{
    imports_for, Arg, Field, Import, InterfaceDecl, Method, NamedType, StructDecl, TypeBody,
    TypeId, TypeKey, TypeShape, EMPTY_INTERFACE, PREDECLARED_TYPES,
};
