//! Run configuration.

use serde::Deserialize;

/// Knobs for a single extraction run.
///
/// Every field has a default, so a partial JSON document such as
/// `{"include_test_files": true}` is a valid configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Manifest that marks a module root
    pub manifest_file: String,
    /// How many directories the module locator may climb
    pub search_up_limit: usize,
    /// Treat `_test.go` files as compilation units of their directory
    pub include_test_files: bool,
    /// Look under `<module root>/vendor` for import paths outside the module
    pub use_vendor: bool,
    /// Import path prefixes that are registered but never resolved
    pub opaque_import_prefixes: Vec<String>,
    /// Also queue body-less types of the referencing file's own package
    pub resolve_local_types: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            manifest_file: "go.mod".to_string(),
            search_up_limit: 10,
            include_test_files: false,
            use_vendor: true,
            opaque_import_prefixes: Vec::new(),
            resolve_local_types: false,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether references into `import_path`, made from inside the module
    /// `module_identity`, are left unresolved.
    ///
    /// Packages of the module itself are never opaque. Outside it, standard
    /// library paths (no `.` in the first element) always are.
    pub fn is_opaque(&self, import_path: &str, module_identity: &str) -> bool {
        if path_has_prefix(import_path, module_identity) {
            return false;
        }
        let first = import_path.split('/').next().unwrap_or_default();
        if !first.contains('.') {
            return true;
        }
        self.opaque_import_prefixes
            .iter()
            .any(|prefix| path_has_prefix(import_path, prefix))
    }
}

/// `prefix` matches whole path elements of `import_path`.
fn path_has_prefix(import_path: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && import_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = "example.com/shop";

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExtractorConfig::from_json_str(r#"{"include_test_files": true}"#).unwrap();
        assert!(config.include_test_files);
        assert_eq!(config.manifest_file, "go.mod");
        assert_eq!(config.search_up_limit, 10);
        assert!(config.use_vendor);
    }

    #[test]
    fn test_standard_library_is_opaque() {
        let config = ExtractorConfig::default();
        assert!(config.is_opaque("time", SHOP));
        assert!(config.is_opaque("encoding/json", SHOP));
        assert!(!config.is_opaque("example.com/shop/catalog", SHOP));
    }

    #[test]
    fn test_dotless_module_paths_are_not_stdlib() {
        let config = ExtractorConfig::default();
        assert!(!config.is_opaque("shop", "shop"));
        assert!(!config.is_opaque("shop/catalog", "shop"));
        assert!(config.is_opaque("shopping/cart", "shop"));
        assert!(config.is_opaque("time", "shop"));
    }

    #[test]
    fn test_opaque_prefix_matches_whole_elements() {
        let config = ExtractorConfig {
            opaque_import_prefixes: vec!["google.golang.org/protobuf".to_string()],
            ..Default::default()
        };
        assert!(config.is_opaque("google.golang.org/protobuf", SHOP));
        assert!(config.is_opaque("google.golang.org/protobuf/types/known/timestamppb", SHOP));
        assert!(!config.is_opaque("google.golang.org/protobufx", SHOP));
    }
}
