/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session has expired or was never started.
    #[error("session unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the value for this key.
    #[error("cannot store {key}: {reason}")]
    Rejected { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;
