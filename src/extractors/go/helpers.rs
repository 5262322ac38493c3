use crate::resolve::TypeExpr;
use tree_sitter::Node;

/// Helper methods for node text and type syntax lowering
impl super::GoExtractor {
    /// Get node text (helper method)
    pub(super) fn get_node_text(&self, node: Node) -> String {
        self.base.get_node_text(&node)
    }

    /// First named child that is not a comment.
    pub(super) fn first_type_child<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        let mut cursor = node.walk();
        let child = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        child
    }

    /// Lower a type node into a [`TypeExpr`]
    pub(super) fn lower_type(&self, node: Node) -> TypeExpr {
        match node.kind() {
            "type_identifier" => TypeExpr::Ident(self.get_node_text(node)),
            "qualified_type" => {
                let package = self.base.get_field_text(&node, "package");
                let name = self.base.get_field_text(&node, "name");
                match (package, name) {
                    (Some(package), Some(name)) => TypeExpr::Qualified { package, name },
                    _ => self.other_type(node),
                }
            }
            "pointer_type" => match self.first_type_child(node) {
                Some(inner) => TypeExpr::pointer(self.lower_type(inner)),
                None => self.other_type(node),
            },
            // (T) is just T
            "parenthesized_type" => match self.first_type_child(node) {
                Some(inner) => self.lower_type(inner),
                None => self.other_type(node),
            },
            "slice_type" => match node.child_by_field_name("element") {
                Some(element) => TypeExpr::slice(self.lower_type(element)),
                None => self.other_type(node),
            },
            "array_type" => {
                let len = self.base.get_field_text(&node, "length").unwrap_or_default();
                match node.child_by_field_name("element") {
                    Some(element) => TypeExpr::Array {
                        len,
                        elem: Box::new(self.lower_type(element)),
                    },
                    None => self.other_type(node),
                }
            }
            "map_type" => {
                match (
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                ) {
                    (Some(key), Some(value)) => {
                        TypeExpr::map(self.lower_type(key), self.lower_type(value))
                    }
                    _ => self.other_type(node),
                }
            }
            "interface_type" => {
                let mut cursor = node.walk();
                let elements = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .count();
                TypeExpr::Interface { elements }
            }
            "function_type" => TypeExpr::Func(self.get_node_text(node)),
            "generic_type" => TypeExpr::Generic(self.get_node_text(node)),
            _ => self.other_type(node),
        }
    }

    fn other_type(&self, node: Node) -> TypeExpr {
        TypeExpr::Other {
            kind: node.kind().to_string(),
            text: self.get_node_text(node),
        }
    }
}

/// Strip the quotes of an interpreted (`"..."`) or raw (`` `...` ``) string literal.
pub(super) fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '`')
}
