//! Metadata caching layer
//!
//! Key derivation, the cache contract consumed by the adapter, and a
//! Moka-backed default implementation.

pub mod errors;
pub mod key;
pub mod store;

pub use errors::CacheError;
pub use key::cache_key;
pub use store::{MetadataCache, MokaCache};
