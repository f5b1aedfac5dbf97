//! Storage error types
//!
//! Failures from the backend store propagate to callers unchanged in kind;
//! the caching layer never converts or retries them.

/// Backend store error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("request timeout")]
    Timeout,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error means the path does not exist on the backend
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
