mod functions;
mod helpers;
mod specs;
mod types;

use crate::error::{Diagnostic, ExtractError, Result, UnsupportedTypeExpression};
use crate::extractors::base::{BaseExtractor, InterfaceDecl, NamedType, StructDecl, TypeShape};
use crate::resolve::{resolve_type_expr, FileScope, TypeExpr};
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

/// Declarations found in one compilation unit, with types resolved but not
/// yet interned.
#[derive(Debug, Clone)]
pub struct FileDeclarations {
    pub scope: FileScope,
    pub structs: Vec<StructDecl<TypeShape>>,
    pub interfaces: Vec<InterfaceDecl<TypeShape>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileDeclarations {
    /// Every named type mentioned by a field, argument or result.
    pub fn referenced_types(&self) -> Vec<&NamedType> {
        let fields = self.structs.iter().flat_map(|s| s.fields.iter().map(|f| &f.ty));
        let signatures = self
            .interfaces
            .iter()
            .flat_map(|i| i.methods.iter())
            .flat_map(|m| m.args.iter().chain(m.results.iter()).map(|a| &a.ty));
        fields
            .chain(signatures)
            .flat_map(|shape| shape.named_leaves())
            .collect()
    }
}

/// Go declaration extractor
///
/// Walks the top-level type declarations of a single file:
/// - `type X struct { ... }` becomes a [`StructDecl`]
/// - `type X interface { ... }` becomes an [`InterfaceDecl`]
/// - aliases, scalar definitions and generic declarations are ignored
///
/// Field and signature types go through [`resolve_type_expr`]; members whose
/// type is unsupported are dropped and reported as diagnostics.
pub struct GoExtractor {
    base: BaseExtractor,
}

/// Mutable state of one extraction pass.
struct Pass {
    scope: FileScope,
    diagnostics: Vec<Diagnostic>,
}

impl GoExtractor {
    pub fn new(file_path: &Path, content: String) -> Self {
        Self {
            base: BaseExtractor::new("go".to_string(), file_path, content),
        }
    }

    /// Extract the declarations of `tree`, a syntactically valid file of the
    /// package whose import path is `import_path`.
    pub fn extract(&self, tree: &Tree, import_path: &str) -> Result<FileDeclarations> {
        let root = tree.root_node();
        if let Some(error) = self.base.find_first_error(&root) {
            let position = error.start_position();
            return Err(ExtractError::Parse {
                path: self.base.file_path.clone(),
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let package_name = self.extract_package_name(root).ok_or_else(|| ExtractError::Parse {
            path: self.base.file_path.clone(),
            line: 1,
            column: 1,
        })?;

        let mut pass = Pass {
            scope: FileScope {
                package_name,
                import_path: import_path.to_string(),
                imports: self.extract_imports(root),
            },
            diagnostics: Vec::new(),
        };

        let mut structs = Vec::new();
        let mut interfaces = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "type_declaration" {
                continue;
            }
            for spec in self.base.get_children_of_type(&child, "type_spec") {
                match self.extract_type_spec(spec, &mut pass)? {
                    Some(Declaration::Struct(decl)) => structs.push(decl),
                    Some(Declaration::Interface(decl)) => interfaces.push(decl),
                    None => {}
                }
            }
        }

        debug!(
            "Extracted {} structs and {} interfaces from {}",
            structs.len(),
            interfaces.len(),
            self.base.file_path.display()
        );

        Ok(FileDeclarations {
            scope: pass.scope,
            structs,
            interfaces,
            diagnostics: pass.diagnostics,
        })
    }

    /// Resolve the type node of a member. `None` means the member is dropped.
    fn resolve_member(
        &self,
        type_node: Node,
        pass: &mut Pass,
        owner: &str,
        member: &str,
    ) -> Option<TypeShape> {
        let expr = self.lower_type(type_node);
        self.resolve_expr(&expr, pass, owner, member)
    }

    fn resolve_expr(
        &self,
        expr: &TypeExpr,
        pass: &mut Pass,
        owner: &str,
        member: &str,
    ) -> Option<TypeShape> {
        match resolve_type_expr(expr, &pass.scope) {
            Ok(shape) => Some(shape),
            Err(error) => {
                self.report(pass, owner, member, error);
                None
            }
        }
    }

    fn report(&self, pass: &mut Pass, owner: &str, member: &str, error: UnsupportedTypeExpression) {
        warn!(
            "Dropping {}.{} in {}: {}",
            owner,
            member,
            self.base.file_path.display(),
            error
        );
        pass.diagnostics.push(Diagnostic {
            file: self.base.file_path.clone(),
            owner: owner.to_string(),
            member: member.to_string(),
            error,
        });
    }
}

enum Declaration {
    Struct(StructDecl<TypeShape>),
    Interface(InterfaceDecl<TypeShape>),
}
