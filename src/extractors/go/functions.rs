use super::Pass;
use crate::error::{ExtractError, Result};
use crate::extractors::base::{Arg, Method, TypeShape};
use crate::resolve::TypeExpr;
use tree_sitter::Node;

/// Interface method signature extraction for Go
impl super::GoExtractor {
    pub(super) fn extract_method_elem(
        &self,
        owner: &str,
        node: Node,
        pass: &mut Pass,
    ) -> Result<Method<TypeShape>> {
        let Some(name) = self.base.get_field_text(&node, "name") else {
            return Err(ExtractError::invariant(format!(
                "method of {} without name in {}",
                owner,
                self.base.file_path.display()
            )));
        };
        let member = format!("{}()", name);

        let args = match node.child_by_field_name("parameters") {
            Some(parameters) => self.extract_parameter_list(owner, &member, parameters, pass)?,
            None => Vec::new(),
        };

        // Results are either `(a A, b B)` or a single bare type
        let results = match node.child_by_field_name("result") {
            Some(result) if result.kind() == "parameter_list" => {
                self.extract_parameter_list(owner, &format!("{} result", member), result, pass)?
            }
            Some(result) => self
                .resolve_member(result, pass, owner, &format!("{} result", member))
                .map(|ty| vec![Arg { name: None, ty }])
                .unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(Method {
            name,
            args,
            results,
            doc_comment: self.base.find_doc_comment(&node),
        })
    }

    pub(super) fn extract_parameter_list(
        &self,
        owner: &str,
        member: &str,
        node: Node,
        pass: &mut Pass,
    ) -> Result<Vec<Arg<TypeShape>>> {
        let mut args = Vec::new();
        let mut cursor = node.walk();

        for (position, child) in node.named_children(&mut cursor).enumerate() {
            match child.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => {
                    self.extract_parameter_declaration(
                        owner, member, position, child, pass, &mut args,
                    )?;
                }
                _ => {}
            }
        }

        Ok(args)
    }

    /// `a, b T`, `T` or `name ...T`. Unsupported types drop every name of the line.
    fn extract_parameter_declaration(
        &self,
        owner: &str,
        member: &str,
        position: usize,
        node: Node,
        pass: &mut Pass,
        args: &mut Vec<Arg<TypeShape>>,
    ) -> Result<()> {
        let Some(type_node) = node.child_by_field_name("type") else {
            return Err(ExtractError::invariant(format!(
                "parameter #{} of {}.{} has no type",
                position, owner, member
            )));
        };

        let mut expr = self.lower_type(type_node);
        if node.kind() == "variadic_parameter_declaration" {
            expr = TypeExpr::variadic(expr);
        }

        let names: Vec<String> = self
            .base
            .get_field_nodes(&node, "name")
            .into_iter()
            .map(|name| self.get_node_text(name))
            .collect();
        let label = if names.is_empty() {
            format!("{} #{}", member, position)
        } else {
            format!("{} {}", member, names.join(", "))
        };

        let Some(ty) = self.resolve_expr(&expr, pass, owner, &label) else {
            return Ok(());
        };

        if names.is_empty() {
            args.push(Arg { name: None, ty });
        } else {
            for name in names {
                args.push(Arg {
                    name: Some(name),
                    ty: ty.clone(),
                });
            }
        }
        Ok(())
    }
}
