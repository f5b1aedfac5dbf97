//! Caching storage adapter
//!
//! The decorator that fronts a backend store with a metadata cache.

pub mod cached;
pub mod url;

pub use cached::CachedStorage;
