use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// An object identifier failed the `[A-Za-z0-9_]+` check.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A type, method, property or key name failed the name check.
    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    /// A declared scope is not one of singleton, prototype or session.
    #[error("unknown scope: {0:?}")]
    UnknownScope(String),

    /// A declared scalar type is not one of bool, int, float, string or null.
    #[error("unknown scalar type: {0:?}")]
    UnknownScalarType(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
