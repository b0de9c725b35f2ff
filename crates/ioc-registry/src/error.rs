//! Error types for registry lookups and invocations.

use thiserror::Error;

/// Failure raised by a registered constructor, method or field setter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvokeError {
    /// A positional argument was not supplied.
    #[error("missing argument #{index}")]
    MissingArgument { index: usize },

    /// A positional argument has the wrong kind.
    #[error("argument #{index}: expected {expected}, got {actual}")]
    BadArgument {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// The callee received an instance of a different Rust type than it was
    /// registered for.
    #[error("receiver is not a {0}")]
    WrongReceiver(String),

    /// The callee rejected its input.
    #[error("{0}")]
    Failed(String),
}

impl InvokeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result alias for registered callables.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with this name is already registered.
    #[error("type already registered: {0}")]
    DuplicateType(String),

    /// No type with this name is registered.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The type has no method with this name.
    #[error("type {type_name} has no method {method}")]
    UnknownMethod { type_name: String, method: String },

    /// The type has no field with this name.
    #[error("type {type_name} has no field {field}")]
    UnknownField { type_name: String, field: String },

    /// The type is abstract or registered without a constructor.
    #[error("type {0} cannot be constructed")]
    NotConstructible(String),

    /// The method exists but cannot be called this way.
    #[error("method {type_name}::{method} is not callable: {reason}")]
    NotCallable {
        type_name: String,
        method: String,
        reason: &'static str,
    },

    /// A registered callable failed.
    #[error("{target}: {source}")]
    Invoke {
        target: String,
        #[source]
        source: InvokeError,
    },
}

impl RegistryError {
    pub(crate) fn invoke(target: impl Into<String>, source: InvokeError) -> Self {
        Self::Invoke {
            target: target.into(),
            source,
        }
    }
}

/// Convenience alias for registry results.
pub type RegistryResult<T> = Result<T, RegistryError>;
