//! Error types for definition documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a definition document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not well-formed in its format.
    #[error("{format} syntax error: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    /// A required attribute is missing.
    #[error("object {object}: missing required attribute '{attribute}'")]
    MissingAttribute {
        object: String,
        attribute: &'static str,
    },

    /// An object identifier fails the `[A-Za-z0-9_]+` check.
    #[error("invalid object id: {0:?}")]
    InvalidId(String),

    /// Two objects share an identifier.
    #[error("duplicate object id: {0}")]
    DuplicateId(String),

    /// Two properties of one object share a name.
    #[error("object {object}: duplicate property '{name}'")]
    DuplicateProperty { object: String, name: String },

    /// A value node does not have exactly one value shape.
    #[error("object {object}, {location}: {reason}")]
    InvalidNode {
        object: String,
        location: String,
        reason: String,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported document format: {}", .0.display())]
    UnknownFormat(PathBuf),

    /// I/O error while reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for document results.
pub type DocumentResult<T> = Result<T, DocumentError>;
