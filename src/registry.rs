//! Type Registry
//!
//! Run-scoped arena of type descriptors. Named types are keyed by
//! `(import path, name)`; pointers, slices and maps are interned structurally
//! so equal shapes share one [`TypeId`]. A named entry is created on first
//! reference and its body is attached later, when the declaring file is
//! parsed. Single-threaded: callers serialize all mutation.
//!
//! Entries never carry a file's import alias. They hold the declaring
//! package's own name, and [`TypeRegistry::render`] takes the qualifier from
//! the import set of whoever is rendering.

use crate::extractors::base::{Import, NamedType, TypeBody, TypeId, TypeKey, TypeShape};
use crate::resolve::default_package_name;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// A named type plus its body, once known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntry {
    #[serde(flatten)]
    pub ty: NamedType,
    pub body: Option<TypeBody>,
}

impl NamedEntry {
    /// Empty-bodied stand-in for a key nobody has referenced yet.
    pub fn placeholder(key: &TypeKey) -> Self {
        let package = if key.import_path.is_empty() {
            String::new()
        } else {
            default_package_name(&key.import_path)
        };
        Self {
            ty: NamedType::new(key.name.clone(), package, key.import_path.clone()),
            body: None,
        }
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Named(NamedEntry),
    Pointer { elem: TypeId },
    Slice { elem: TypeId },
    Map { key: TypeId, value: TypeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DescriptorKey {
    Named(TypeKey),
    Pointer(TypeId),
    Slice(TypeId),
    Map(TypeId, TypeId),
}

#[derive(Debug, Default, Serialize)]
pub struct TypeRegistry {
    descriptors: Vec<TypeDescriptor>,
    #[serde(skip)]
    index: HashMap<DescriptorKey, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Existing entry for `key`, or an empty placeholder. Never fails.
    pub fn get(&self, key: &TypeKey) -> Cow<'_, NamedEntry> {
        match self.id_of(key).and_then(|id| self.named(id)) {
            Some(entry) => Cow::Borrowed(entry),
            None => Cow::Owned(NamedEntry::placeholder(key)),
        }
    }

    pub fn id_of(&self, key: &TypeKey) -> Option<TypeId> {
        self.index.get(&DescriptorKey::Named(key.clone())).copied()
    }

    /// Register a named type if its key is absent. Idempotent.
    ///
    /// The package name of `ty` is dropped for the one Go tooling assumes
    /// from the import path until [`set`](Self::set) supplies the real one.
    pub fn add(&mut self, mut ty: NamedType) -> TypeId {
        let key = DescriptorKey::Named(ty.key());
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        if !ty.is_builtin() {
            ty.package = default_package_name(&ty.import_path);
        }
        self.push(key, TypeDescriptor::Named(NamedEntry { ty, body: None }))
    }

    /// Attach (or replace) the body of a named type, creating the entry if
    /// nothing referenced it yet.
    pub fn set(&mut self, key: &TypeKey, body: TypeBody) -> TypeId {
        let id = match self.id_of(key) {
            Some(id) => id,
            None => self.add(NamedType::new(
                key.name.clone(),
                String::new(),
                key.import_path.clone(),
            )),
        };

        if let Some(TypeDescriptor::Named(entry)) = self.descriptors.get_mut(id.index()) {
            if entry.body.is_some() {
                warn!("Replacing already attached body of {}", key);
            }
            // Name from the declaring file's package clause
            entry.ty.package = match &body {
                TypeBody::Struct(s) => s.package.clone(),
                TypeBody::Interface(i) => i.package.clone(),
            };
            entry.ty.is_interface = matches!(body, TypeBody::Interface(_));
            entry.body = Some(body);
            debug!("Attached body to {}", key);
        }
        id
    }

    /// Intern a resolved shape, registering every named type it mentions.
    pub fn intern(&mut self, shape: &TypeShape) -> TypeId {
        match shape {
            TypeShape::Named(named) => self.add(named.clone()),
            TypeShape::Pointer { elem } => {
                let elem = self.intern(elem);
                self.intern_composite(
                    DescriptorKey::Pointer(elem),
                    TypeDescriptor::Pointer { elem },
                )
            }
            TypeShape::Slice { elem } => {
                let elem = self.intern(elem);
                self.intern_composite(DescriptorKey::Slice(elem), TypeDescriptor::Slice { elem })
            }
            TypeShape::Map { key, value } => {
                let key = self.intern(key);
                let value = self.intern(value);
                self.intern_composite(
                    DescriptorKey::Map(key, value),
                    TypeDescriptor::Map { key, value },
                )
            }
        }
    }

    fn intern_composite(&mut self, key: DescriptorKey, descriptor: TypeDescriptor) -> TypeId {
        match self.index.get(&key) {
            Some(id) => *id,
            None => self.push(key, descriptor),
        }
    }

    fn push(&mut self, key: DescriptorKey, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(self.descriptors.len() as u32);
        self.descriptors.push(descriptor);
        self.index.insert(key, id);
        id
    }

    /// Descriptor behind `id`; `None` for ids minted by another registry.
    pub fn descriptor(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.descriptors.get(id.index())
    }

    pub fn named(&self, id: TypeId) -> Option<&NamedEntry> {
        match self.descriptors.get(id.index()) {
            Some(TypeDescriptor::Named(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn body(&self, key: &TypeKey) -> Option<&TypeBody> {
        self.id_of(key)
            .and_then(|id| self.named(id))
            .and_then(|entry| entry.body.as_ref())
    }

    /// Named types reachable from `id` through pointers, slices and maps.
    pub fn named_leaves(&self, id: TypeId) -> Vec<TypeId> {
        match self.descriptor(id) {
            Some(TypeDescriptor::Named(_)) => vec![id],
            Some(TypeDescriptor::Pointer { elem } | TypeDescriptor::Slice { elem }) => {
                self.named_leaves(*elem)
            }
            Some(TypeDescriptor::Map { key, value }) => {
                let mut leaves = self.named_leaves(*key);
                leaves.extend(self.named_leaves(*value));
                leaves
            }
            None => Vec::new(),
        }
    }

    /// Go spelling of `id` as seen from the package `from`.
    ///
    /// Imported types are qualified with the name `imports` binds for their
    /// path (a declaration's `used_imports` or `dependencies`), falling back
    /// to the declaring package's own name.
    pub fn render(&self, id: TypeId, from: &str, imports: &BTreeSet<Import>) -> Option<String> {
        let rendered = match self.descriptor(id)? {
            TypeDescriptor::Named(entry) if entry.ty.is_imported_into(from) => {
                let qualifier = imports
                    .iter()
                    .find(|import| import.path == entry.ty.import_path)
                    .map_or(entry.ty.package.as_str(), |import| import.name.as_str());
                format!("{}.{}", qualifier, entry.ty.name)
            }
            TypeDescriptor::Named(entry) => entry.ty.name.clone(),
            TypeDescriptor::Pointer { elem } => {
                format!("*{}", self.render(*elem, from, imports)?)
            }
            TypeDescriptor::Slice { elem } => {
                format!("[]{}", self.render(*elem, from, imports)?)
            }
            TypeDescriptor::Map { key, value } => format!(
                "map[{}]{}",
                self.render(*key, from, imports)?,
                self.render(*value, from, imports)?
            ),
        };
        Some(rendered)
    }

    pub fn iter_named(&self) -> impl Iterator<Item = (TypeId, &NamedEntry)> {
        self.descriptors
            .iter()
            .enumerate()
            .filter_map(|(i, descriptor)| match descriptor {
                TypeDescriptor::Named(entry) => Some((TypeId(i as u32), entry)),
                _ => None,
            })
    }

    /// Non-builtin named types that never received a body.
    pub fn unresolved(&self) -> Vec<TypeKey> {
        self.iter_named()
            .filter(|(_, entry)| !entry.ty.is_builtin() && !entry.has_body())
            .map(|(_, entry)| entry.ty.key())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{Field, StructDecl};
    use std::path::PathBuf;

    const CATALOG: &str = "example.com/shop/catalog";

    fn product() -> NamedType {
        NamedType::new("Product", "catalog", CATALOG)
    }

    fn product_body(registry: &mut TypeRegistry) -> TypeBody {
        let string = registry.add(NamedType::builtin("string"));
        TypeBody::Struct(StructDecl {
            name: "Product".to_string(),
            package: "catalog".to_string(),
            import_path: CATALOG.to_string(),
            fields: vec![Field {
                name: "SKU".to_string(),
                embedded: false,
                ty: string,
                tag: None,
            }],
            used_imports: BTreeSet::new(),
            doc_comment: None,
            file_path: PathBuf::from("/m/catalog/product.go"),
        })
    }

    #[test]
    fn test_get_unknown_key_yields_placeholder() {
        let registry = TypeRegistry::new();
        let entry = registry.get(&TypeKey::new(CATALOG, "Product"));
        assert!(matches!(entry, Cow::Owned(_)));
        assert!(!entry.has_body());
        assert_eq!(entry.ty.package, "catalog");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let first = registry.add(product());
        let second = registry.add(NamedType::new("Product", "cat", CATALOG));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&product().key()).ty.package, "catalog");
    }

    #[test]
    fn test_import_alias_is_not_stored() {
        let mut registry = TypeRegistry::new();
        let id = registry.add(NamedType::new("Order", "pb", "example.com/shop/orderpb"));
        assert_eq!(registry.named(id).unwrap().ty.package, "orderpb");

        let aliased = BTreeSet::from([Import::new("pb", "example.com/shop/orderpb")]);
        let plain = BTreeSet::from([Import::new("orderpb", "example.com/shop/orderpb")]);
        let from = "example.com/shop/b";
        assert_eq!(registry.render(id, from, &aliased).unwrap(), "pb.Order");
        assert_eq!(registry.render(id, from, &plain).unwrap(), "orderpb.Order");
        assert_eq!(registry.render(id, from, &BTreeSet::new()).unwrap(), "orderpb.Order");
    }

    #[test]
    fn test_set_takes_name_from_package_clause() {
        let mut registry = TypeRegistry::new();
        let key = TypeKey::new("example.com/shop/internal/store", "Conn");
        let id = registry.add(NamedType::new("Conn", "st", key.import_path.clone()));
        assert_eq!(registry.named(id).unwrap().ty.package, "store");
        registry.set(
            &key,
            TypeBody::Struct(StructDecl {
                name: "Conn".to_string(),
                package: "storage".to_string(),
                import_path: key.import_path.clone(),
                fields: Vec::new(),
                used_imports: BTreeSet::new(),
                doc_comment: None,
                file_path: PathBuf::from("/m/internal/store/conn.go"),
            }),
        );
        assert_eq!(registry.named(id).unwrap().ty.package, "storage");
    }

    #[test]
    fn test_foreign_ids_are_rejected() {
        let mut registry = TypeRegistry::new();
        registry.add(product());
        let foreign = TypeId(7);
        assert!(registry.descriptor(foreign).is_none());
        assert!(registry.render(foreign, CATALOG, &BTreeSet::new()).is_none());
        assert!(registry.named_leaves(foreign).is_empty());
    }

    #[test]
    fn test_set_fills_forward_reference_in_place() {
        let mut registry = TypeRegistry::new();
        let id = registry.add(product());
        assert!(!registry.get(&product().key()).has_body());

        let body = product_body(&mut registry);
        let set_id = registry.set(&product().key(), body);
        assert_eq!(id, set_id);
        assert!(registry.get(&product().key()).has_body());
        assert!(registry.unresolved().is_empty());
    }

    #[test]
    fn test_set_without_prior_reference_creates_entry() {
        let mut registry = TypeRegistry::new();
        let body = product_body(&mut registry);
        let id = registry.set(&product().key(), body);
        assert_eq!(registry.named(id).unwrap().ty.package, "catalog");
        assert!(registry.body(&product().key()).is_some());
    }

    #[test]
    fn test_composite_shapes_are_shared() {
        let mut registry = TypeRegistry::new();
        let shape = TypeShape::slice(TypeShape::pointer(TypeShape::Named(product())));
        let a = registry.intern(&shape);
        let b = registry.intern(&TypeShape::slice(TypeShape::pointer(TypeShape::Named(
            product(),
        ))));
        assert_eq!(a, b);
        // Product, *Product, []*Product
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.render(a, "example.com/shop/order", &BTreeSet::new()).unwrap(),
            "[]*catalog.Product"
        );
    }

    #[test]
    fn test_named_leaves_walk_maps() {
        let mut registry = TypeRegistry::new();
        let shape = TypeShape::map(
            TypeShape::Named(NamedType::builtin("string")),
            TypeShape::slice(TypeShape::Named(product())),
        );
        let id = registry.intern(&shape);
        let leaves: Vec<String> = registry
            .named_leaves(id)
            .into_iter()
            .map(|leaf| registry.named(leaf).unwrap().ty.name.clone())
            .collect();
        assert_eq!(leaves, vec!["string".to_string(), "Product".to_string()]);
    }

    #[test]
    fn test_unresolved_ignores_builtins() {
        let mut registry = TypeRegistry::new();
        registry.add(NamedType::builtin("int"));
        registry.add(product());
        assert_eq!(registry.unresolved(), vec![product().key()]);
    }
}
