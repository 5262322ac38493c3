//! Error kinds for an extraction run.
//!
//! Everything in [`ExtractError`] is fatal: the run driver returns it and the
//! caller aborts. [`UnsupportedTypeExpression`] is the one recoverable
//! condition and never travels through `Err`.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{manifest} not found within {limit} directories above {start}")]
    ManifestNotFound {
        manifest: String,
        start: PathBuf,
        limit: usize,
    },

    #[error("{manifest} declares no module directive")]
    ModuleDirectiveMissing { manifest: PathBuf },

    #[error("syntax error in {path} at {line}:{column}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("cannot map import path '{import_path}' to a package directory (referenced from {referenced_from})")]
    PackageResolution {
        import_path: String,
        referenced_from: PathBuf,
    },

    #[error("[ BUG ] {0}")]
    InternalInvariant(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load grammar: {0}")]
    Language(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        ExtractError::InternalInvariant(message.into())
    }
}

/// Why a type expression has no representable descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnsupportedReason {
    /// `func(...)` cannot be used in transport code.
    Function,
    /// Parametrized instantiations such as `List[T]`.
    Generic,
    /// Qualifier does not match any import of the file.
    UnknownPackage(String),
    /// Anonymous interface literal that lists methods or embeds types.
    InterfaceWithMethods,
    /// Any other syntax kind (channels, anonymous structs, ...).
    Other(String),
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsupportedReason::Function => write!(f, "function types cannot be used in transport"),
            UnsupportedReason::Generic => write!(f, "generic instantiation is not supported"),
            UnsupportedReason::UnknownPackage(pkg) => {
                write!(f, "package qualifier '{}' matches no import", pkg)
            }
            UnsupportedReason::InterfaceWithMethods => {
                write!(f, "only the empty interface literal is supported")
            }
            UnsupportedReason::Other(kind) => write!(f, "unsupported type syntax '{}'", kind),
        }
    }
}

/// Non-fatal: the offending field or argument is omitted and extraction
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unsupported type expression `{expr}`: {reason}")]
pub struct UnsupportedTypeExpression {
    pub expr: String,
    pub reason: UnsupportedReason,
}

impl UnsupportedTypeExpression {
    pub fn new(expr: impl Into<String>, reason: UnsupportedReason) -> Self {
        Self {
            expr: expr.into(),
            reason,
        }
    }
}

/// A member dropped from a declaration because its type was unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    /// Declaration the member belonged to
    pub owner: String,
    /// Field name, or `Get() id` / `Get() result #0` for signatures
    pub member: String,
    pub error: UnsupportedTypeExpression,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: dropped {}.{}: {}",
            self.file.display(),
            self.owner,
            self.member,
            self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display_names_expression_and_reason() {
        let err = UnsupportedTypeExpression::new("func()", UnsupportedReason::Function);
        assert_eq!(
            err.to_string(),
            "unsupported type expression `func()`: function types cannot be used in transport"
        );
    }

    #[test]
    fn test_fatal_errors_render_context() {
        let err = ExtractError::ManifestNotFound {
            manifest: "go.mod".to_string(),
            start: PathBuf::from("/tmp/x"),
            limit: 3,
        };
        assert_eq!(err.to_string(), "go.mod not found within 3 directories above /tmp/x");

        let err = ExtractError::invariant("method Get has no type");
        assert!(err.to_string().starts_with("[ BUG ]"));
    }
}
