//! Module Locator
//!
//! Finds the `go.mod` that owns a file, reads the module path it declares and
//! maps between package directories and import paths. Read-only filesystem
//! access only.

use crate::error::{ExtractError, Result};
use crate::module_map::ModuleDescriptor;
use crate::utils::paths::{to_absolute_native, to_relative_unix_style};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static MODULE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?"#).expect("module directive regex is valid")
});

const VENDOR_DIR: &str = "vendor";

/// Walk up from `start_dir` looking for `manifest`.
///
/// `start_dir` itself and at most `limit` ancestors are inspected.
pub fn find_manifest(start_dir: &Path, manifest: &str, limit: usize) -> Result<PathBuf> {
    let mut current = Some(start_dir);
    for _ in 0..=limit {
        let Some(dir) = current else { break };
        let candidate = dir.join(manifest);
        if candidate.is_file() {
            return Ok(candidate);
        }
        current = dir.parent();
    }

    Err(ExtractError::ManifestNotFound {
        manifest: manifest.to_string(),
        start: start_dir.to_path_buf(),
        limit,
    })
}

/// Module path declared by a `go.mod` file.
pub fn read_module_identity(manifest: &Path) -> Result<String> {
    let content = fs::read_to_string(manifest).map_err(|e| ExtractError::io(manifest, e))?;
    MODULE_DIRECTIVE
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::ModuleDirectiveMissing {
            manifest: manifest.to_path_buf(),
        })
}

/// Module owning `file` (which must be absolute).
pub fn locate_module(file: &Path, manifest: &str, limit: usize) -> Result<ModuleDescriptor> {
    let start = file.parent().unwrap_or(file);
    let manifest_path = find_manifest(start, manifest, limit)?;
    let root = manifest_path
        .parent()
        .ok_or_else(|| ExtractError::invariant("manifest path has no parent directory"))?
        .to_path_buf();
    let identity = read_module_identity(&manifest_path)?;
    debug!("Module {} rooted at {}", identity, root.display());
    Ok(ModuleDescriptor::new(identity, root))
}

/// Fully qualified import path of the package in `dir`.
///
/// Directories under `<root>/vendor` map to the vendored import path.
pub fn import_path_for_dir(module: &ModuleDescriptor, dir: &Path) -> Result<String> {
    let relative = to_relative_unix_style(dir, &module.root)?;
    if relative.is_empty() {
        return Ok(module.identity.clone());
    }
    if let Some(vendored) = relative.strip_prefix("vendor/") {
        return Ok(vendored.to_string());
    }
    Ok(format!("{}/{}", module.identity, relative))
}

/// Package directory inside `module` (or its vendor tree) for `import_path`.
pub fn package_dir(
    module: &ModuleDescriptor,
    import_path: &str,
    use_vendor: bool,
    referenced_from: &Path,
) -> Result<PathBuf> {
    let mut candidates = Vec::with_capacity(2);
    if import_path == module.identity {
        candidates.push(module.root.clone());
    } else if let Some(rest) = import_path
        .strip_prefix(module.identity.as_str())
        .and_then(|rest| rest.strip_prefix('/'))
    {
        candidates.push(to_absolute_native(rest, &module.root));
    }
    if use_vendor {
        candidates.push(to_absolute_native(import_path, &module.root.join(VENDOR_DIR)));
    }

    candidates
        .into_iter()
        .find(|dir| dir.is_dir())
        .ok_or_else(|| ExtractError::PackageResolution {
            import_path: import_path.to_string(),
            referenced_from: referenced_from.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_tree() -> (TempDir, ModuleDescriptor) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("shop");
        fs::create_dir_all(root.join("catalog")).unwrap();
        fs::create_dir_all(root.join("vendor/github.com/acme/money")).unwrap();
        fs::write(
            root.join("go.mod"),
            "// shop service\nmodule example.com/shop // main module\n\ngo 1.21\n",
        )
        .unwrap();
        let module = ModuleDescriptor::new("example.com/shop".to_string(), root);
        (temp, module)
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let (_temp, module) = module_tree();
        let deep = module.root.join("catalog/internal/db");
        fs::create_dir_all(&deep).unwrap();

        let manifest = find_manifest(&deep, "go.mod", 3).unwrap();
        assert_eq!(manifest, module.root.join("go.mod"));
    }

    #[test]
    fn test_find_manifest_respects_limit() {
        let (_temp, module) = module_tree();
        let deep = module.root.join("a/b/c/d");
        fs::create_dir_all(&deep).unwrap();

        let err = find_manifest(&deep, "go.mod", 2).unwrap_err();
        assert!(matches!(err, ExtractError::ManifestNotFound { limit: 2, .. }));
        assert!(find_manifest(&deep, "go.mod", 4).is_ok());
    }

    #[test]
    fn test_read_module_identity_handles_comments_and_quotes() {
        let (temp, module) = module_tree();
        assert_eq!(
            read_module_identity(&module.root.join("go.mod")).unwrap(),
            "example.com/shop"
        );

        let quoted = temp.path().join("quoted.mod");
        fs::write(&quoted, "module \"example.com/quoted\"\n").unwrap();
        assert_eq!(read_module_identity(&quoted).unwrap(), "example.com/quoted");

        let empty = temp.path().join("empty.mod");
        fs::write(&empty, "go 1.21\n").unwrap();
        assert!(matches!(
            read_module_identity(&empty),
            Err(ExtractError::ModuleDirectiveMissing { .. })
        ));
    }

    #[test]
    fn test_locate_module_from_file() {
        let (_temp, module) = module_tree();
        let file = module.root.join("catalog/product.go");
        let located = locate_module(&file, "go.mod", 5).unwrap();
        assert_eq!(located.identity, "example.com/shop");
        assert_eq!(located.root, module.root);
    }

    #[test]
    fn test_import_path_for_dirs() {
        let (_temp, module) = module_tree();
        assert_eq!(import_path_for_dir(&module, &module.root).unwrap(), "example.com/shop");
        assert_eq!(
            import_path_for_dir(&module, &module.root.join("catalog")).unwrap(),
            "example.com/shop/catalog"
        );
        assert_eq!(
            import_path_for_dir(&module, &module.root.join("vendor/github.com/acme/money"))
                .unwrap(),
            "github.com/acme/money"
        );
    }

    #[test]
    fn test_package_dir_inside_module_and_vendor() {
        let (_temp, module) = module_tree();
        let from = module.root.join("order/order.go");

        let dir = package_dir(&module, "example.com/shop/catalog", true, &from).unwrap();
        assert_eq!(dir, module.root.join("catalog"));

        let dir = package_dir(&module, "github.com/acme/money", true, &from).unwrap();
        assert_eq!(dir, module.root.join("vendor/github.com/acme/money"));

        let err = package_dir(&module, "github.com/acme/money", false, &from).unwrap_err();
        assert!(matches!(err, ExtractError::PackageResolution { .. }));

        let err = package_dir(&module, "example.com/shop/missing", true, &from).unwrap_err();
        assert!(err.to_string().contains("example.com/shop/missing"));
    }
}
