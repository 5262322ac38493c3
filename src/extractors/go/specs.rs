use super::helpers::unquote;
use crate::resolve::ImportSpec;
use tree_sitter::Node;

/// Extraction of the package clause and import declarations
impl super::GoExtractor {
    pub(super) fn extract_package_name(&self, root: Node) -> Option<String> {
        let clause = self.base.get_children_of_type(&root, "package_clause");
        let clause = clause.first()?;
        self.base
            .get_children_of_type(clause, "package_identifier")
            .first()
            .map(|ident| self.get_node_text(*ident))
    }

    pub(super) fn extract_imports(&self, root: Node) -> Vec<ImportSpec> {
        let mut imports = Vec::new();

        for declaration in self.base.get_children_of_type(&root, "import_declaration") {
            let mut cursor = declaration.walk();
            for child in declaration.named_children(&mut cursor) {
                match child.kind() {
                    "import_spec" => imports.extend(self.extract_import_spec(child)),
                    "import_spec_list" => {
                        for spec in self.base.get_children_of_type(&child, "import_spec") {
                            imports.extend(self.extract_import_spec(spec));
                        }
                    }
                    _ => {}
                }
            }
        }

        imports
    }

    fn extract_import_spec(&self, node: Node) -> Option<ImportSpec> {
        let path = self.base.get_field_text(&node, "path")?;
        Some(ImportSpec {
            // `_` and `.` are recorded too; they bind no qualifier
            alias: self.base.get_field_text(&node, "name"),
            path: unquote(&path).to_string(),
        })
    }
}
