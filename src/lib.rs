//! Metadata-caching decorator for remote object storage backends
//!
//! Fetching size, mimetype, timestamps, or visibility from a remote object
//! store costs a network round trip per query. [`CachedStorage`] wraps any
//! [`StorageBackend`] and keeps a per-path metadata cache, populated from
//! the records mutations already return and invalidated as files are
//! renamed, copied, or deleted. File content and directory listings are
//! never cached; the cache is strictly an optimization and an unreachable
//! cache only costs latency, never correctness.
//!
//! ```
//! use cached_storage::{CachedStorage, MemoryBackend, MokaCache, StorageBackend, WriteConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), cached_storage::StorageError> {
//! let store = CachedStorage::new(MemoryBackend::new(), MokaCache::new());
//!
//! store.write("docs/readme.md", b"# hello", &WriteConfig::default()).await?;
//!
//! // Answered from the cache, no backend round trip
//! assert_eq!(store.size("docs/readme.md").await?, 7);
//! assert!(store.has("docs/readme.md").await?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cache;
pub mod storage;

pub use adapter::CachedStorage;
pub use cache::{cache_key, CacheError, MetadataCache, MokaCache};
pub use storage::{
    ByteStream, MemoryBackend, Metadata, MetadataKind, ProtectedUrl, PublicUrl, StorageBackend,
    StorageError, Visibility, WriteConfig,
};
