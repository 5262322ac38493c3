// Path Conversion Utilities
//
// Conversion between absolute native paths and module-relative Unix-style
// paths (the shape import paths are built from), plus package directory
// enumeration.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Convert an absolute path to a path relative to `root` with `/` separators
///
/// Returns an empty string when `absolute` is `root` itself.
///
/// # Examples
/// ```
/// // /home/dev/shop/catalog relative to /home/dev/shop
/// // => "catalog"
/// ```
pub fn to_relative_unix_style(absolute: &Path, root: &Path) -> Result<String> {
    // Canonicalize both sides so symlinked roots (/var -> /private/var on macOS)
    // still compare equal; fall back to the paths as given if either is missing
    let (path_to_use, root_to_use) = match (absolute.canonicalize(), root.canonicalize()) {
        (Ok(canonical_abs), Ok(canonical_root)) => (canonical_abs, canonical_root),
        _ => (absolute.to_path_buf(), root.to_path_buf()),
    };

    let relative = path_to_use.strip_prefix(&root_to_use).with_context(|| {
        format!(
            "Path '{}' is not within module root '{}'",
            path_to_use.display(),
            root_to_use.display()
        )
    })?;

    let path_str = relative.to_str().context("Path contains invalid UTF-8")?;

    // On Unix, MAIN_SEPARATOR is already '/', so this is a no-op
    let unix_style = if MAIN_SEPARATOR == '\\' {
        path_str.replace('\\', "/")
    } else {
        path_str.to_string()
    };

    Ok(unix_style)
}

/// Join a relative Unix-style path (e.g. `catalog/v2`) onto `root`
pub fn to_absolute_native(relative_unix: &str, root: &Path) -> PathBuf {
    relative_unix
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Compilation units directly inside `dir`, sorted by file name
pub fn go_source_files(dir: &Path, include_tests: bool) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .with_context(|| format!("Package directory '{}' is not valid UTF-8", dir.display()))?;
    let pattern = format!("{}/*.go", glob::Pattern::escape(dir_str));

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid glob '{}'", pattern))? {
        let path = entry.with_context(|| format!("Failed to list '{}'", dir.display()))?;
        if path.is_file() && crate::language::is_go_source(&path, include_tests) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_package_dir_relative_to_module_root() {
        let root = PathBuf::from("/home/dev/shop");
        let dir = PathBuf::from("/home/dev/shop/internal/catalog");

        let result = to_relative_unix_style(&dir, &root).unwrap();

        assert_eq!(result, "internal/catalog");
        assert!(!result.contains('\\'), "Should have no backslashes");
    }

    #[test]
    fn test_module_root_is_empty_relative_path() {
        let root = PathBuf::from("/home/dev/shop");
        assert_eq!(to_relative_unix_style(&root, &root).unwrap(), "");
    }

    #[test]
    fn test_path_outside_root_rejected() {
        let root = PathBuf::from("/home/dev/shop");
        let outside = PathBuf::from("/etc/passwd");

        let result = to_relative_unix_style(&outside, &root);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not within module root"));
    }

    #[test]
    fn test_round_trip_conversion() {
        let root = PathBuf::from("/home/dev/shop");
        let absolute = to_absolute_native("api/v2", &root);
        assert_eq!(absolute, PathBuf::from("/home/dev/shop/api/v2"));
        assert_eq!(to_relative_unix_style(&absolute, &root).unwrap(), "api/v2");
    }

    #[test]
    fn test_go_source_files_lists_only_units() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b.go"), "package p\n").unwrap();
        fs::write(dir.join("a.go"), "package p\n").unwrap();
        fs::write(dir.join("a_test.go"), "package p\n").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("c.go"), "package nested\n").unwrap();

        let files = go_source_files(dir, false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);

        assert_eq!(go_source_files(dir, true).unwrap().len(), 3);
    }
}
