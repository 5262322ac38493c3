use super::{Declaration, Pass};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{imports_for, Field, InterfaceDecl, StructDecl, TypeShape};
use crate::resolve::TypeExpr;
use tracing::debug;
use tree_sitter::Node;

/// Type declaration extraction for Go (structs and interfaces)
impl super::GoExtractor {
    pub(super) fn extract_type_spec(
        &self,
        node: Node,
        pass: &mut Pass,
    ) -> Result<Option<Declaration>> {
        let Some(name) = self.base.get_field_text(&node, "name") else {
            return Err(ExtractError::invariant(format!(
                "type spec without name in {}",
                self.base.file_path.display()
            )));
        };

        if node.child_by_field_name("type_parameters").is_some() {
            debug!("Skipping generic declaration {} in {}", name, self.base.file_path.display());
            return Ok(None);
        }

        let Some(type_node) = node.child_by_field_name("type") else {
            return Err(ExtractError::invariant(format!("type {} has no type node", name)));
        };

        // Doc comment sits on the type_spec inside `type ( ... )`, on the declaration otherwise
        let doc_comment = self.base.find_doc_comment(&node).or_else(|| {
            node.parent()
                .and_then(|parent| self.base.find_doc_comment(&parent))
        });

        match type_node.kind() {
            "struct_type" => {
                let decl = self.extract_struct(&name, type_node, doc_comment, pass)?;
                Ok(Some(Declaration::Struct(decl)))
            }
            "interface_type" => {
                let decl = self.extract_interface(&name, type_node, doc_comment, pass)?;
                Ok(Some(Declaration::Interface(decl)))
            }
            _ => Ok(None),
        }
    }

    fn extract_struct(
        &self,
        name: &str,
        struct_node: Node,
        doc_comment: Option<String>,
        pass: &mut Pass,
    ) -> Result<StructDecl<TypeShape>> {
        let mut fields = Vec::new();

        for list in self.base.get_children_of_type(&struct_node, "field_declaration_list") {
            for declaration in self.base.get_children_of_type(&list, "field_declaration") {
                self.extract_field_declaration(name, declaration, pass, &mut fields)?;
            }
        }

        let used_imports = imports_for(fields.iter().map(|f| &f.ty), &pass.scope.import_path);
        Ok(StructDecl {
            name: name.to_string(),
            package: pass.scope.package_name.clone(),
            import_path: pass.scope.import_path.clone(),
            fields,
            used_imports,
            doc_comment,
            file_path: self.base.file_path.clone(),
        })
    }

    /// One field line: `A, B T`, `T`, `*T` or `pkg.T`, each with an optional tag.
    fn extract_field_declaration(
        &self,
        owner: &str,
        node: Node,
        pass: &mut Pass,
        fields: &mut Vec<Field<TypeShape>>,
    ) -> Result<()> {
        let Some(type_node) = node.child_by_field_name("type") else {
            return Err(ExtractError::invariant(format!(
                "field of {} has no type in {}",
                owner,
                self.base.file_path.display()
            )));
        };
        let tag = self.base.get_field_text(&node, "tag");
        let names = self.base.get_field_nodes(&node, "name");

        if names.is_empty() {
            let mut expr = self.lower_type(type_node);
            if self.has_pointer_marker(node) {
                expr = TypeExpr::pointer(expr);
            }
            // Generic embeddings have no plain name; they are reported as unsupported below
            let field_name = expr
                .embedded_name()
                .map(str::to_string)
                .unwrap_or_else(|| expr.to_string());
            if let Some(ty) = self.resolve_expr(&expr, pass, owner, &field_name) {
                fields.push(Field {
                    name: field_name,
                    embedded: true,
                    ty,
                    tag,
                });
            }
            return Ok(());
        }

        let expr = self.lower_type(type_node);
        for name_node in names {
            let field_name = self.get_node_text(name_node);
            if let Some(ty) = self.resolve_expr(&expr, pass, owner, &field_name) {
                fields.push(Field {
                    name: field_name,
                    embedded: false,
                    ty,
                    tag: tag.clone(),
                });
            }
        }
        Ok(())
    }

    /// `*Base` as an embedded field keeps the `*` outside the type node.
    fn has_pointer_marker(&self, field: Node) -> bool {
        let mut cursor = field.walk();
        let found = field
            .children(&mut cursor)
            .any(|child| !child.is_named() && child.kind() == "*");
        found
    }

    fn extract_interface(
        &self,
        name: &str,
        interface_node: Node,
        doc_comment: Option<String>,
        pass: &mut Pass,
    ) -> Result<InterfaceDecl<TypeShape>> {
        let mut methods = Vec::new();

        let mut cursor = interface_node.walk();
        for child in interface_node.named_children(&mut cursor) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    methods.push(self.extract_method_elem(name, child, pass)?);
                }
                "comment" => {}
                // Embedded interfaces and constraint unions are not flattened
                _ => debug!(
                    "Not expanding `{}` embedded in {}",
                    self.get_node_text(child),
                    name
                ),
            }
        }

        let dependencies = imports_for(
            methods
                .iter()
                .flat_map(|m| m.args.iter().chain(m.results.iter()))
                .map(|arg| &arg.ty),
            &pass.scope.import_path,
        );

        Ok(InterfaceDecl {
            name: name.to_string(),
            package: pass.scope.package_name.clone(),
            import_path: pass.scope.import_path.clone(),
            methods,
            dependencies,
            doc_comment,
            file_path: self.base.file_path.clone(),
        })
    }
}
