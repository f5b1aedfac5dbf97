//! Cache error types
//!
//! A cache failure is never allowed to fail the storage operation it was
//! meant to speed up; the adapter logs it and carries on.

/// Metadata cache error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache codec error: {0}")]
    Codec(String),
}
