//! Metadata cache contract and default implementation
//!
//! The adapter only needs get/set/delete/has by opaque string key; any
//! key-value store qualifies. [`MokaCache`] is the bundled in-process
//! implementation, with eviction and TTL owned by Moka.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use tracing::trace;

use crate::storage::Metadata;

use super::errors::CacheError;

/// Key-value store for metadata records
///
/// Keys are opaque strings (see [`super::cache_key`]). Implementations own
/// their eviction and TTL policy; the adapter imposes none.
pub trait MetadataCache: Send + Sync {
    /// Whether an entry exists for `key`
    fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Fetch the entry for `key`, if any
    fn get(&self, key: &str) -> Result<Option<Metadata>, CacheError>;

    /// Store `record` under `key`, replacing any existing entry
    fn set(&self, key: &str, record: Metadata) -> Result<(), CacheError>;

    /// Remove the entry for `key`, if any
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process metadata cache backed by Moka
///
/// Tracks hit/miss counters for observability. Never returns an error.
pub struct MokaCache {
    entries: Cache<String, Metadata>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MokaCache {
    /// Create a cache with no expiration
    pub fn new() -> Self {
        Self::build(Cache::builder().name("metadata_cache"))
    }

    /// Create a cache whose entries expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::build(Cache::builder().name("metadata_cache").time_to_live(ttl))
    }

    fn build(builder: moka::sync::CacheBuilder<String, Metadata, Cache<String, Metadata>>) -> Self {
        Self {
            entries: builder.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache statistics
    ///
    /// Returns (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCache for MokaCache {
    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Option<Metadata>, CacheError> {
        match self.entries.get(key) {
            Some(record) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = key, "cache HIT");
                Ok(Some(record))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = key, "cache MISS");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, record: Metadata) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), record);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key);
        Ok(())
    }
}
