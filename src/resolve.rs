//! Type expression resolution.
//!
//! [`TypeExpr`] is the closed set of type syntax shapes the Go extractor
//! lowers tree-sitter nodes into. [`resolve_type_expr`] maps one of them to a
//! [`TypeShape`] using the imports of the file it appears in. It has no side
//! effects: registering the result is the caller's job.

use crate::error::{UnsupportedReason, UnsupportedTypeExpression};
use crate::extractors::base::{Import, NamedType, TypeShape, PREDECLARED_TYPES};
use std::fmt;

/// Syntax-level type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `Name`
    Ident(String),
    /// `pkg.Name`
    Qualified { package: String, name: String },
    /// `*X`
    Pointer(Box<TypeExpr>),
    /// `[]X`
    Slice(Box<TypeExpr>),
    /// `[N]X`
    Array { len: String, elem: Box<TypeExpr> },
    /// `...X` in a parameter list
    Variadic(Box<TypeExpr>),
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// `interface{ ... }` with the number of listed elements
    Interface { elements: usize },
    /// `func(...) ...`
    Func(String),
    /// `Name[T]`
    Generic(String),
    /// Channels, anonymous structs and anything else
    Other { kind: String, text: String },
}

impl TypeExpr {
    pub fn ident(name: &str) -> Self {
        TypeExpr::Ident(name.to_string())
    }

    pub fn qualified(package: &str, name: &str) -> Self {
        TypeExpr::Qualified {
            package: package.to_string(),
            name: name.to_string(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(elem))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    pub fn variadic(elem: TypeExpr) -> Self {
        TypeExpr::Variadic(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Name an embedded field of this type gets: `Base` for `*pkg.Base`.
    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) | TypeExpr::Qualified { name, .. } => Some(name.as_str()),
            TypeExpr::Pointer(elem) => elem.embedded_name(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident(name) => write!(f, "{}", name),
            TypeExpr::Qualified { package, name } => write!(f, "{}.{}", package, name),
            TypeExpr::Pointer(elem) => write!(f, "*{}", elem),
            TypeExpr::Slice(elem) => write!(f, "[]{}", elem),
            TypeExpr::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Variadic(elem) => write!(f, "...{}", elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Interface { elements: 0 } => write!(f, "interface{{}}"),
            TypeExpr::Interface { .. } => write!(f, "interface{{...}}"),
            TypeExpr::Func(text) | TypeExpr::Generic(text) => write!(f, "{}", text),
            TypeExpr::Other { text, .. } => write!(f, "{}", text),
        }
    }
}

/// One `import` line of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit name: an alias, `_` or `.`
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// The qualifier this import binds in the file, if any.
    pub fn binding(&self) -> Option<String> {
        match self.alias.as_deref() {
            Some("_") | Some(".") => None,
            Some(alias) => Some(alias.to_string()),
            None => Some(default_package_name(&self.path)),
        }
    }
}

/// Package name Go tooling assumes for an unaliased import path.
///
/// A trailing `/vN` element is skipped, a `go-` prefix is dropped and the
/// name ends at the first character that cannot appear in an identifier:
/// `example.com/api/v2` → `api`, `gopkg.in/yaml.v3` → `yaml`,
/// `github.com/mattn/go-sqlite3` → `sqlite3`, `github.com/x/yaml-go` → `yaml`.
pub fn default_package_name(import_path: &str) -> String {
    let mut elements = import_path.rsplit('/');
    let last = elements.next().unwrap_or(import_path);

    let is_major_version =
        |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit());

    let name = if is_major_version(last) {
        elements.next().unwrap_or(last)
    } else {
        last
    };
    let name = name.strip_prefix("go-").unwrap_or(name);

    name.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// What a type expression needs to know about the file it appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileScope {
    /// Declared package name (`package order`)
    pub package_name: String,
    /// Fully qualified import path of that package
    pub import_path: String,
    pub imports: Vec<ImportSpec>,
}

impl FileScope {
    /// Import bound to `qualifier` in this file.
    pub fn import_for(&self, qualifier: &str) -> Option<Import> {
        self.imports.iter().find_map(|spec| {
            spec.binding()
                .filter(|binding| binding == qualifier)
                .map(|binding| Import::new(binding, spec.path.clone()))
        })
    }
}

/// Resolve a type expression to its canonical shape.
pub fn resolve_type_expr(
    expr: &TypeExpr,
    scope: &FileScope,
) -> Result<TypeShape, UnsupportedTypeExpression> {
    resolve_inner(expr, scope)
        .map_err(|reason| UnsupportedTypeExpression::new(expr.to_string(), reason))
}

fn resolve_inner(expr: &TypeExpr, scope: &FileScope) -> Result<TypeShape, UnsupportedReason> {
    match expr {
        TypeExpr::Ident(name) if name == "any" => {
            Ok(TypeShape::Named(NamedType::empty_interface()))
        }
        TypeExpr::Ident(name) if PREDECLARED_TYPES.contains(&name.as_str()) => {
            Ok(TypeShape::Named(NamedType::builtin(name.clone())))
        }
        TypeExpr::Ident(name) => Ok(TypeShape::Named(NamedType::new(
            name.clone(),
            scope.package_name.clone(),
            scope.import_path.clone(),
        ))),
        TypeExpr::Qualified { package, name } => {
            let import = scope
                .import_for(package)
                .ok_or_else(|| UnsupportedReason::UnknownPackage(package.clone()))?;
            Ok(TypeShape::Named(NamedType::new(
                name.clone(),
                import.name,
                import.path,
            )))
        }
        TypeExpr::Pointer(elem) => Ok(TypeShape::pointer(resolve_inner(elem, scope)?)),
        TypeExpr::Slice(elem) | TypeExpr::Variadic(elem) | TypeExpr::Array { elem, .. } => {
            Ok(TypeShape::slice(resolve_inner(elem, scope)?))
        }
        TypeExpr::Map { key, value } => {
            let key = resolve_inner(key, scope)?;
            let value = resolve_inner(value, scope)?;
            Ok(TypeShape::map(key, value))
        }
        TypeExpr::Interface { elements: 0 } => {
            Ok(TypeShape::Named(NamedType::empty_interface()))
        }
        TypeExpr::Interface { .. } => Err(UnsupportedReason::InterfaceWithMethods),
        TypeExpr::Func(_) => Err(UnsupportedReason::Function),
        TypeExpr::Generic(_) => Err(UnsupportedReason::Generic),
        TypeExpr::Other { kind, .. } => Err(UnsupportedReason::Other(kind.clone())),
    }
}
