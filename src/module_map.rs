//! Module/Package Map
//!
//! Tracks the modules and packages discovered during a run and which
//! compilation units were already parsed. The per-file guard here is what
//! makes every file parse at most once and lets package cycles terminate.

use crate::extractors::base::TypeId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A module: its declared path and the directory holding its `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub identity: String,
    pub root: PathBuf,
}

impl ModuleDescriptor {
    pub fn new(identity: String, root: PathBuf) -> Self {
        Self { identity, root }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    /// Directory relative to the module root, `.` for the root package
    pub name: String,
    /// Name from the `package` clause
    pub package_name: String,
    pub import_path: String,
    pub dir: PathBuf,
    /// Struct declarations in parse order
    pub structs: Vec<TypeId>,
    /// Interface declarations in parse order
    pub interfaces: Vec<TypeId>,
    pub parsed_files: BTreeSet<PathBuf>,
}

impl PackageDescriptor {
    fn new(name: &str, package_name: &str, import_path: &str, dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            package_name: package_name.to_string(),
            import_path: import_path.to_string(),
            dir: dir.to_path_buf(),
            structs: Vec::new(),
            interfaces: Vec::new(),
            parsed_files: BTreeSet::new(),
        }
    }

    pub fn add_struct(&mut self, id: TypeId) {
        if !self.structs.contains(&id) {
            self.structs.push(id);
        }
    }

    pub fn add_interface(&mut self, id: TypeId) {
        if !self.interfaces.contains(&id) {
            self.interfaces.push(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    #[serde(flatten)]
    pub module: ModuleDescriptor,
    pub packages: BTreeMap<String, PackageDescriptor>,
}

/// Where a package lives: owning module identity plus relative package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PackageRef {
    module: String,
    package: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ModuleMap {
    modules: BTreeMap<String, ModuleEntry>,
    /// Directory -> identity of the module owning it
    #[serde(skip)]
    dirs: HashMap<PathBuf, String>,
    #[serde(skip)]
    import_paths: HashMap<String, PackageRef>,
    #[serde(skip)]
    files: HashMap<PathBuf, PackageRef>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module already known to own `dir`.
    pub fn module_of_dir(&self, dir: &Path) -> Option<&ModuleDescriptor> {
        self.dirs
            .get(dir)
            .and_then(|identity| self.modules.get(identity))
            .map(|entry| &entry.module)
    }

    /// Register `module` as the owner of `dir`. The first registration of an
    /// identity wins.
    pub fn add_module(&mut self, module: ModuleDescriptor, dir: &Path) -> &ModuleDescriptor {
        self.dirs
            .entry(dir.to_path_buf())
            .or_insert_with(|| module.identity.clone());
        let identity = module.identity.clone();
        &self
            .modules
            .entry(identity)
            .or_insert_with(|| ModuleEntry {
                module,
                packages: BTreeMap::new(),
            })
            .module
    }

    pub fn module(&self, identity: &str) -> Option<&ModuleEntry> {
        self.modules.get(identity)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    /// Get or create the package `name` of module `identity`.
    ///
    /// Returns `None` when the module was never registered.
    pub fn package_mut(
        &mut self,
        identity: &str,
        name: &str,
        package_name: &str,
        import_path: &str,
        dir: &Path,
    ) -> Option<&mut PackageDescriptor> {
        let entry = self.modules.get_mut(identity)?;
        self.import_paths
            .entry(import_path.to_string())
            .or_insert_with(|| PackageRef {
                module: identity.to_string(),
                package: name.to_string(),
            });
        Some(
            entry
                .packages
                .entry(name.to_string())
                .or_insert_with(|| PackageDescriptor::new(name, package_name, import_path, dir)),
        )
    }

    pub fn package(&self, import_path: &str) -> Option<&PackageDescriptor> {
        let package_ref = self.import_paths.get(import_path)?;
        self.lookup(package_ref)
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.modules.values().flat_map(|entry| entry.packages.values())
    }

    /// Package a parsed file was recorded under.
    pub fn package_of_file(&self, file: &Path) -> Option<&PackageDescriptor> {
        let package_ref = self.files.get(file)?;
        self.lookup(package_ref)
    }

    fn lookup(&self, package_ref: &PackageRef) -> Option<&PackageDescriptor> {
        self.modules
            .get(&package_ref.module)
            .and_then(|entry| entry.packages.get(&package_ref.package))
    }

    pub fn is_parsed(&self, file: &Path) -> bool {
        self.files.contains_key(file)
    }

    /// Record `file` as parsed. Returns false if it already was.
    pub fn mark_parsed(&mut self, identity: &str, package: &str, file: &Path) -> bool {
        if self.files.contains_key(file) {
            return false;
        }
        let Some(descriptor) = self
            .modules
            .get_mut(identity)
            .and_then(|entry| entry.packages.get_mut(package))
        else {
            return false;
        };
        descriptor.parsed_files.insert(file.to_path_buf());
        self.files.insert(
            file.to_path_buf(),
            PackageRef {
                module: identity.to_string(),
                package: package.to_string(),
            },
        );
        true
    }

    pub fn parsed_file_count(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ModuleDescriptor {
        ModuleDescriptor::new("example.com/shop".to_string(), PathBuf::from("/src/shop"))
    }

    fn with_catalog() -> ModuleMap {
        let mut map = ModuleMap::new();
        map.add_module(shop(), Path::new("/src/shop"));
        map.package_mut(
            "example.com/shop",
            "catalog",
            "catalog",
            "example.com/shop/catalog",
            Path::new("/src/shop/catalog"),
        )
        .unwrap();
        map
    }

    #[test]
    fn test_add_module_is_idempotent() {
        let mut map = ModuleMap::new();
        map.add_module(shop(), Path::new("/src/shop/order"));
        map.add_module(shop(), Path::new("/src/shop/catalog"));
        assert_eq!(map.modules().count(), 1);
        assert_eq!(
            map.module_of_dir(Path::new("/src/shop/catalog")).unwrap().identity,
            "example.com/shop"
        );
        assert!(map.module_of_dir(Path::new("/src/shop")).is_none());
    }

    #[test]
    fn test_mark_parsed_guards_against_reparse() {
        let mut map = with_catalog();
        let file = Path::new("/src/shop/catalog/product.go");

        assert!(!map.is_parsed(file));
        assert!(map.mark_parsed("example.com/shop", "catalog", file));
        assert!(map.is_parsed(file));
        assert!(!map.mark_parsed("example.com/shop", "catalog", file));

        let package = map.package("example.com/shop/catalog").unwrap();
        assert_eq!(package.parsed_files.len(), 1);
        assert_eq!(map.package_of_file(file).unwrap().name, "catalog");
        assert_eq!(map.parsed_file_count(), 1);
    }

    #[test]
    fn test_unknown_module_has_no_packages() {
        let mut map = ModuleMap::new();
        assert!(map
            .package_mut("example.com/none", ".", "none", "example.com/none", Path::new("/x"))
            .is_none());
        assert!(!map.mark_parsed("example.com/none", ".", Path::new("/x/a.go")));
    }

    #[test]
    fn test_declarations_are_not_duplicated() {
        let mut map = with_catalog();
        let package = map
            .package_mut(
                "example.com/shop",
                "catalog",
                "catalog",
                "example.com/shop/catalog",
                Path::new("/src/shop/catalog"),
            )
            .unwrap();
        package.add_struct(TypeId(3));
        package.add_struct(TypeId(3));
        package.add_interface(TypeId(4));
        assert_eq!(package.structs, vec![TypeId(3)]);
        assert_eq!(package.interfaces, vec![TypeId(4)]);
    }
}
