//! Error types for the container.

use ioc_document::DocumentError;
use ioc_session::SessionError;
use ioc_types::TypeError;
use thiserror::Error;

/// Errors raised while building a container or resolving objects.
///
/// Every error aborts the whole top-level call that raised it. Nothing
/// partially built is cached.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// An object identifier fails the `[A-Za-z0-9_]+` check.
    #[error("invalid object identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A definition attribute is malformed. Raised when the attribute is read.
    #[error("definition {id}: {message}")]
    DefinitionParse { id: String, message: String },

    /// An object depends on itself. `path` ends with the repeated id.
    #[error("circular reference: {}", .path.join(" -> "))]
    CircularReference { path: Vec<String> },

    /// The object could not be built.
    #[error("cannot instantiate {id}: {message}")]
    Instantiation { id: String, message: String },

    /// No definition for the requested id (strict absent policy only).
    #[error("no object definition for {0}")]
    NotFound(String),

    /// Invalid container configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("session store error: {0}")]
    Session(#[from] SessionError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl ContainerError {
    pub(crate) fn parse(id: &str, message: impl Into<String>) -> Self {
        Self::DefinitionParse {
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn instantiation(id: &str, message: impl Into<String>) -> Self {
        Self::Instantiation {
            id: id.to_string(),
            message: message.into(),
        }
    }

    /// Returns `true` for a circular reference.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }
}

/// Convenience alias for container results.
pub type ContainerResult<T> = Result<T, ContainerError>;
