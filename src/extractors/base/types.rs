// Base Extractor Types
//
// Data structures shared by the Go extractor, the type registry and the run
// driver: type keys and descriptors, struct/interface declarations, imports.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Index of a descriptor inside the [`TypeRegistry`](crate::registry::TypeRegistry) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registry key of a named type: `(import path, name)`.
///
/// Builtins and the `interface{}` sentinel use an empty import path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TypeKey {
    pub import_path: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.import_path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.import_path, self.name)
        }
    }
}

/// Identifiers the Go universe block predeclares as types.
pub const PREDECLARED_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

pub const EMPTY_INTERFACE: &str = "interface{}";

/// A named type reference: builtin, local or imported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamedType {
    pub name: String,
    /// Package name used to qualify the type in generated code (empty for builtins)
    pub package: String,
    pub import_path: String,
    pub is_interface: bool,
}

impl NamedType {
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        import_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            import_path: import_path.into(),
            is_interface: false,
        }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        let name = name.into();
        let is_interface = name == "error";
        Self {
            name,
            package: String::new(),
            import_path: String::new(),
            is_interface,
        }
    }

    /// The single `interface{}` sentinel.
    pub fn empty_interface() -> Self {
        Self {
            is_interface: true,
            ..Self::builtin(EMPTY_INTERFACE)
        }
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.import_path.clone(), self.name.clone())
    }

    pub fn is_builtin(&self) -> bool {
        self.import_path.is_empty()
    }

    /// True when the type lives in a package other than `import_path`.
    pub fn is_imported_into(&self, import_path: &str) -> bool {
        !self.is_builtin() && self.import_path != import_path
    }

    /// Go spelling relative to the package `from`.
    pub fn render(&self, from: &str) -> String {
        if self.is_imported_into(from) && !self.package.is_empty() {
            format!("{}.{}", self.package, self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Fully resolved type expression as an owned tree.
///
/// This is what the type expression resolver produces before the registry
/// interns it into [`TypeId`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    Named(NamedType),
    Pointer { elem: Box<TypeShape> },
    Slice { elem: Box<TypeShape> },
    Map { key: Box<TypeShape>, value: Box<TypeShape> },
}

impl TypeShape {
    pub fn pointer(elem: TypeShape) -> Self {
        TypeShape::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeShape) -> Self {
        TypeShape::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeShape, value: TypeShape) -> Self {
        TypeShape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Named types reachable through pointers, slices and maps.
    pub fn named_leaves(&self) -> Vec<&NamedType> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a NamedType>) {
        match self {
            TypeShape::Named(named) => out.push(named),
            TypeShape::Pointer { elem } | TypeShape::Slice { elem } => elem.collect_leaves(out),
            TypeShape::Map { key, value } => {
                key.collect_leaves(out);
                value.collect_leaves(out);
            }
        }
    }

    /// Go spelling relative to the package `from`.
    pub fn render(&self, from: &str) -> String {
        match self {
            TypeShape::Named(named) => named.render(from),
            TypeShape::Pointer { elem } => format!("*{}", elem.render(from)),
            TypeShape::Slice { elem } => format!("[]{}", elem.render(from)),
            TypeShape::Map { key, value } => {
                format!("map[{}]{}", key.render(from), value.render(from))
            }
        }
    }
}

/// Import descriptor: display name plus import path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Import {
    pub name: String,
    pub path: String,
}

impl Import {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Imports needed to spell every type in `shapes` from package `from`.
pub fn imports_for<'a>(
    shapes: impl IntoIterator<Item = &'a TypeShape>,
    from: &str,
) -> BTreeSet<Import> {
    shapes
        .into_iter()
        .flat_map(|shape| shape.named_leaves())
        .filter(|named| named.is_imported_into(from))
        .map(|named| Import::new(named.package.clone(), named.import_path.clone()))
        .collect()
}

/// Struct field. Embedded fields carry the embedded type's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field<T = TypeId> {
    pub name: String,
    pub embedded: bool,
    #[serde(rename = "type")]
    pub ty: T,
    /// Raw tag literal including its quotes, e.g. `` `json:"id"` ``
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDecl<T = TypeId> {
    pub name: String,
    pub package: String,
    pub import_path: String,
    pub fields: Vec<Field<T>>,
    pub used_imports: BTreeSet<Import>,
    pub doc_comment: Option<String>,
    pub file_path: PathBuf,
}

/// Method argument or result. Unnamed parameters have no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arg<T = TypeId> {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method<T = TypeId> {
    pub name: String,
    pub args: Vec<Arg<T>>,
    pub results: Vec<Arg<T>>,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDecl<T = TypeId> {
    pub name: String,
    pub package: String,
    pub import_path: String,
    pub methods: Vec<Method<T>>,
    pub dependencies: BTreeSet<Import>,
    pub doc_comment: Option<String>,
    pub file_path: PathBuf,
}

impl<T> StructDecl<T> {
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.import_path.clone(), self.name.clone())
    }

    /// Rebuild the declaration with every field type mapped through `f`.
    pub fn map_types<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<StructDecl<U>, E> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| -> Result<Field<U>, E> {
                Ok(Field {
                    name: field.name,
                    embedded: field.embedded,
                    ty: f(field.ty)?,
                    tag: field.tag,
                })
            })
            .collect::<Result<Vec<_>, E>>()?;
        Ok(StructDecl {
            name: self.name,
            package: self.package,
            import_path: self.import_path,
            fields,
            used_imports: self.used_imports,
            doc_comment: self.doc_comment,
            file_path: self.file_path,
        })
    }
}

impl<T> InterfaceDecl<T> {
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.import_path.clone(), self.name.clone())
    }

    /// Rebuild the declaration with every argument/result type mapped through `f`.
    pub fn map_types<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<InterfaceDecl<U>, E> {
        let mut map_args = |args: Vec<Arg<T>>| -> Result<Vec<Arg<U>>, E> {
            args.into_iter()
                .map(|arg| -> Result<Arg<U>, E> {
                    Ok(Arg {
                        name: arg.name,
                        ty: f(arg.ty)?,
                    })
                })
                .collect()
        };

        let mut methods = Vec::with_capacity(self.methods.len());
        for method in self.methods {
            methods.push(Method {
                name: method.name,
                args: map_args(method.args)?,
                results: map_args(method.results)?,
                doc_comment: method.doc_comment,
            });
        }

        Ok(InterfaceDecl {
            name: self.name,
            package: self.package,
            import_path: self.import_path,
            methods,
            dependencies: self.dependencies,
            doc_comment: self.doc_comment,
            file_path: self.file_path,
        })
    }
}

/// Body attached to a named type once its declaring file is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeBody {
    Struct(StructDecl),
    Interface(InterfaceDecl),
}

impl TypeBody {
    pub fn as_struct(&self) -> Option<&StructDecl> {
        match self {
            TypeBody::Struct(s) => Some(s),
            TypeBody::Interface(_) => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match self {
            TypeBody::Interface(i) => Some(i),
            TypeBody::Struct(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TypeBody::Struct(s) => s.fields.is_empty(),
            TypeBody::Interface(i) => i.methods.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_product() -> NamedType {
        NamedType::new("Product", "catalog", "example.com/shop/catalog")
    }

    #[test]
    fn test_render_qualifies_only_imported_types() {
        let shape = TypeShape::map(
            TypeShape::Named(NamedType::builtin("string")),
            TypeShape::slice(TypeShape::pointer(TypeShape::Named(catalog_product()))),
        );
        assert_eq!(
            shape.render("example.com/shop/order"),
            "map[string][]*catalog.Product"
        );
        assert_eq!(shape.render("example.com/shop/catalog"), "map[string][]*Product");
    }

    #[test]
    fn test_imports_for_skips_builtins_and_local_types() {
        let local = TypeShape::Named(NamedType::new("Order", "order", "example.com/shop/order"));
        let builtin = TypeShape::Named(NamedType::builtin("int64"));
        let imported = TypeShape::slice(TypeShape::Named(catalog_product()));

        let imports = imports_for([&local, &builtin, &imported], "example.com/shop/order");
        assert_eq!(imports.len(), 1);
        assert!(imports.contains(&Import::new("catalog", "example.com/shop/catalog")));
    }

    #[test]
    fn test_error_builtin_is_an_interface() {
        assert!(NamedType::builtin("error").is_interface);
        assert!(!NamedType::builtin("string").is_interface);
        assert!(NamedType::empty_interface().is_builtin());
    }
}
