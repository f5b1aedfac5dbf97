//! Caching storage adapter
//!
//! Wraps a [`StorageBackend`] and maintains a [`MetadataCache`] keyed by
//! path, so repeated metadata queries skip the backend round trip. Every
//! mutation delegates to the backend first; the cache is only touched on
//! backend success. The cache is strictly an optimization: with an empty
//! or unreachable cache every operation still returns the same results,
//! just slower.

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::{debug, trace, warn};

use crate::cache::{cache_key, MetadataCache};
use crate::storage::{
    ByteStream, Metadata, MetadataKind, StorageBackend, StorageError, Visibility, WriteConfig,
};

/// Storage backend decorator that caches per-path metadata
///
/// Implements [`StorageBackend`] itself, so it can stand in anywhere a
/// backend is expected. Holds no mutable state of its own; safe to share
/// behind an `Arc` without extra locking. There is no atomicity across the
/// backend call and the cache update, so concurrent mutations of the same
/// path can leave the cache reflecting either outcome.
#[derive(Clone)]
pub struct CachedStorage<B, C> {
    backend: B,
    cache: C,
}

impl<B, C> CachedStorage<B, C>
where
    B: StorageBackend,
    C: MetadataCache,
{
    pub fn new(backend: B, cache: C) -> Self {
        Self { backend, cache }
    }

    /// The wrapped backend store
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The metadata cache collaborator
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Unwrap into the collaborators
    pub fn into_inner(self) -> (B, C) {
        (self.backend, self.cache)
    }

    /// Cached record for `path`, treating cache failures as a miss
    fn cached(&self, path: &str) -> Option<Metadata> {
        match self.cache.get(&cache_key(path)) {
            Ok(Some(record)) => {
                trace!(path = path, "metadata cache hit");
                Some(record)
            }
            Ok(None) => {
                trace!(path = path, "metadata cache miss");
                None
            }
            Err(e) => {
                warn!(path = path, error = %e, "metadata cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store `record` under `path`'s key, swallowing cache failures
    fn store(&self, path: &str, record: Metadata) {
        if let Err(e) = self.cache.set(&cache_key(path), record) {
            warn!(path = path, error = %e, "metadata cache write failed, skipping");
        }
    }

    /// Drop the cache entry for `path`, swallowing cache failures
    fn evict(&self, path: &str) {
        if let Err(e) = self.cache.delete(&cache_key(path)) {
            warn!(path = path, error = %e, "metadata cache delete failed, skipping");
        }
    }

    /// Union-merge a freshly reported record into the cache entry for `path`
    ///
    /// Attributes already cached but absent from `fresh` are preserved, so
    /// partial results accumulate across operations. Empty records are not
    /// cached.
    fn merge_into_cache(&self, path: &str, fresh: &Metadata) {
        if fresh.is_empty() {
            return;
        }
        let mut record = match self.cached(path) {
            Some(existing) => existing,
            None => Metadata::new(path),
        };
        record.merge(fresh);
        debug!(path = path, "cached metadata");
        self.store(path, record);
    }

    /// Fetch one attribute live from the backend and merge it into the cache
    ///
    /// The attribute kind maps to the matching backend accessor here; the
    /// returned record carries exactly the requested attribute.
    async fn fetch_attr(&self, path: &str, kind: MetadataKind) -> Result<Metadata, StorageError> {
        let fetched = match kind {
            MetadataKind::Size => Metadata::new(path).with_size(self.backend.size(path).await?),
            MetadataKind::Mimetype => {
                Metadata::new(path).with_mimetype(self.backend.mimetype(path).await?)
            }
            MetadataKind::Timestamp => {
                Metadata::new(path).with_timestamp(self.backend.timestamp(path).await?)
            }
            MetadataKind::Visibility => {
                Metadata::new(path).with_visibility(self.backend.visibility(path).await?)
            }
        };
        debug!(path = path, attr = kind.as_str(), "fetched attribute from backend");
        self.merge_into_cache(path, &fetched);
        Ok(fetched)
    }
}

#[async_trait]
impl<B, C> StorageBackend for CachedStorage<B, C>
where
    B: StorageBackend,
    C: MetadataCache,
{
    async fn write(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.write(path, contents, config).await?;
        self.merge_into_cache(path, &metadata);
        Ok(metadata)
    }

    async fn write_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.write_stream(path, reader, config).await?;
        self.merge_into_cache(path, &metadata);
        Ok(metadata)
    }

    async fn update(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.update(path, contents, config).await?;
        self.merge_into_cache(path, &metadata);
        Ok(metadata)
    }

    async fn update_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.update_stream(path, reader, config).await?;
        self.merge_into_cache(path, &metadata);
        Ok(metadata)
    }

    async fn rename(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
        self.backend.rename(path, newpath).await?;

        if let Some(mut record) = self.cached(path) {
            record.path = newpath.to_string();
            self.store(newpath, record);
        }
        // Evict the source key whether or not an entry existed
        self.evict(path);
        debug!(from = path, to = newpath, "moved cached metadata");
        Ok(())
    }

    async fn copy(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
        self.backend.copy(path, newpath).await?;

        if let Some(mut record) = self.cached(path) {
            record.path = newpath.to_string();
            self.store(newpath, record);
            debug!(from = path, to = newpath, "duplicated cached metadata");
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.backend.delete(path).await?;
        self.evict(path);
        debug!(path = path, "evicted cached metadata");
        Ok(())
    }

    async fn delete_dir(&self, dirname: &str) -> Result<(), StorageError> {
        // The backend cannot enumerate children after the delete, so the
        // affected paths must be captured first.
        let contents = self.backend.list_contents(dirname, true).await?;

        self.backend.delete_dir(dirname).await?;

        for entry in &contents {
            self.evict(&entry.path);
        }
        self.evict(dirname);
        debug!(
            dirname = dirname,
            entries = contents.len(),
            "evicted cached metadata for deleted directory"
        );
        Ok(())
    }

    async fn create_dir(
        &self,
        dirname: &str,
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.create_dir(dirname, config).await?;

        // Warm the cache; a directory has no prior entry to merge with
        if !metadata.is_empty() {
            self.store(dirname, metadata.clone());
            debug!(dirname = dirname, "cached directory metadata");
        }
        Ok(metadata)
    }

    async fn set_visibility(
        &self,
        path: &str,
        visibility: Visibility,
    ) -> Result<Metadata, StorageError> {
        let metadata = self.backend.set_visibility(path, visibility).await?;
        self.merge_into_cache(path, &metadata);
        Ok(metadata)
    }

    async fn has(&self, path: &str) -> Result<bool, StorageError> {
        match self.cache.has(&cache_key(path)) {
            Ok(true) => {
                trace!(path = path, "existence answered from cache");
                return Ok(true);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = path, error = %e, "metadata cache read failed, treating as miss");
            }
        }

        // Only positive cache presence is trusted; a miss is ambiguous
        // between "not cached" and "not existing".
        self.backend.has(path).await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        // File content is never cached here
        self.backend.read(path).await
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        self.backend.read_stream(path).await
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<Metadata>, StorageError> {
        // Listings are never cached, to avoid tracking incomplete entries
        self.backend.list_contents(directory, recursive).await
    }

    async fn metadata(&self, path: &str) -> Result<Metadata, StorageError> {
        if let Some(record) = self.cached(path) {
            return Ok(record);
        }

        let fetched = self.backend.metadata(path).await?;
        self.merge_into_cache(path, &fetched);
        Ok(fetched)
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        if let Some(size) = self.cached(path).and_then(|record| record.size) {
            return Ok(size);
        }
        let fetched = self.fetch_attr(path, MetadataKind::Size).await?;
        fetched
            .size
            .ok_or_else(|| StorageError::Backend(format!("no size reported for {path}")))
    }

    async fn mimetype(&self, path: &str) -> Result<String, StorageError> {
        if let Some(mimetype) = self.cached(path).and_then(|record| record.mimetype) {
            return Ok(mimetype);
        }
        let fetched = self.fetch_attr(path, MetadataKind::Mimetype).await?;
        fetched
            .mimetype
            .ok_or_else(|| StorageError::Backend(format!("no mimetype reported for {path}")))
    }

    async fn timestamp(&self, path: &str) -> Result<i64, StorageError> {
        if let Some(timestamp) = self.cached(path).and_then(|record| record.timestamp) {
            return Ok(timestamp);
        }
        let fetched = self.fetch_attr(path, MetadataKind::Timestamp).await?;
        fetched
            .timestamp
            .ok_or_else(|| StorageError::Backend(format!("no timestamp reported for {path}")))
    }

    async fn visibility(&self, path: &str) -> Result<Visibility, StorageError> {
        if let Some(visibility) = self.cached(path).and_then(|record| record.visibility) {
            return Ok(visibility);
        }
        let fetched = self.fetch_attr(path, MetadataKind::Visibility).await?;
        fetched
            .visibility
            .ok_or_else(|| StorageError::Backend(format!("no visibility reported for {path}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::cache::{CacheError, MokaCache};
    use crate::storage::MemoryBackend;

    /// Backend wrapper that logs every call as "op path"
    struct RecordingBackend {
        inner: MemoryBackend,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, op: &str, path: &str) {
            self.calls.lock().unwrap().push(format!("{op} {path}"));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, op: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.starts_with(op))
                .count()
        }
    }

    #[async_trait]
    impl StorageBackend for RecordingBackend {
        async fn write(
            &self,
            path: &str,
            contents: &[u8],
            config: &WriteConfig,
        ) -> Result<Metadata, StorageError> {
            self.record("write", path);
            self.inner.write(path, contents, config).await
        }

        async fn write_stream(
            &self,
            path: &str,
            reader: &mut (dyn AsyncRead + Send + Unpin),
            config: &WriteConfig,
        ) -> Result<Metadata, StorageError> {
            self.record("write_stream", path);
            self.inner.write_stream(path, reader, config).await
        }

        async fn update(
            &self,
            path: &str,
            contents: &[u8],
            config: &WriteConfig,
        ) -> Result<Metadata, StorageError> {
            self.record("update", path);
            self.inner.update(path, contents, config).await
        }

        async fn update_stream(
            &self,
            path: &str,
            reader: &mut (dyn AsyncRead + Send + Unpin),
            config: &WriteConfig,
        ) -> Result<Metadata, StorageError> {
            self.record("update_stream", path);
            self.inner.update_stream(path, reader, config).await
        }

        async fn rename(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
            self.record("rename", path);
            self.inner.rename(path, newpath).await
        }

        async fn copy(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
            self.record("copy", path);
            self.inner.copy(path, newpath).await
        }

        async fn delete(&self, path: &str) -> Result<(), StorageError> {
            self.record("delete", path);
            self.inner.delete(path).await
        }

        async fn delete_dir(&self, dirname: &str) -> Result<(), StorageError> {
            self.record("delete_dir", dirname);
            self.inner.delete_dir(dirname).await
        }

        async fn create_dir(
            &self,
            dirname: &str,
            config: &WriteConfig,
        ) -> Result<Metadata, StorageError> {
            self.record("create_dir", dirname);
            self.inner.create_dir(dirname, config).await
        }

        async fn set_visibility(
            &self,
            path: &str,
            visibility: Visibility,
        ) -> Result<Metadata, StorageError> {
            self.record("set_visibility", path);
            self.inner.set_visibility(path, visibility).await
        }

        async fn has(&self, path: &str) -> Result<bool, StorageError> {
            self.record("has", path);
            self.inner.has(path).await
        }

        async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
            self.record("read", path);
            self.inner.read(path).await
        }

        async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
            self.record("read_stream", path);
            self.inner.read_stream(path).await
        }

        async fn list_contents(
            &self,
            directory: &str,
            recursive: bool,
        ) -> Result<Vec<Metadata>, StorageError> {
            self.record("list_contents", directory);
            self.inner.list_contents(directory, recursive).await
        }

        async fn metadata(&self, path: &str) -> Result<Metadata, StorageError> {
            self.record("metadata", path);
            self.inner.metadata(path).await
        }

        async fn size(&self, path: &str) -> Result<u64, StorageError> {
            self.record("size", path);
            self.inner.size(path).await
        }

        async fn mimetype(&self, path: &str) -> Result<String, StorageError> {
            self.record("mimetype", path);
            self.inner.mimetype(path).await
        }

        async fn timestamp(&self, path: &str) -> Result<i64, StorageError> {
            self.record("timestamp", path);
            self.inner.timestamp(path).await
        }

        async fn visibility(&self, path: &str) -> Result<Visibility, StorageError> {
            self.record("visibility", path);
            self.inner.visibility(path).await
        }
    }

    /// Cache whose every method fails, to prove cache trouble never fails
    /// the storage operation
    struct FailingCache;

    impl MetadataCache for FailingCache {
        fn has(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }

        fn get(&self, _key: &str) -> Result<Option<Metadata>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }

        fn set(&self, _key: &str, _record: Metadata) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    /// Route adapter logs through the test harness, honoring RUST_LOG
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn store() -> CachedStorage<RecordingBackend, MokaCache> {
        init_logging();
        CachedStorage::new(RecordingBackend::new(), MokaCache::new())
    }

    #[tokio::test]
    async fn test_has_unknown_path_delegates() {
        let store = store();

        assert!(!store.has("never-written.txt").await.unwrap());
        assert_eq!(store.backend().count("has"), 1);
    }

    #[tokio::test]
    async fn test_write_populates_cache() {
        let store = store();
        let written = store
            .write("docs/a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        let record = store.metadata("docs/a.txt").await.unwrap();
        assert_eq!(record.size, written.size);
        assert_eq!(record.mimetype, written.mimetype);
        // Answered from cache, no backend metadata call
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_has_answered_from_cache_after_write() {
        let store = store();
        store
            .write("docs/a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        assert!(store.has("docs/a.txt").await.unwrap());
        assert_eq!(store.backend().count("has"), 0);
    }

    #[tokio::test]
    async fn test_metadata_miss_fetches_once() {
        let store = store();
        // Seed the backend directly, bypassing the cache
        store
            .backend()
            .inner
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        let first = store.metadata("a.txt").await.unwrap();
        let second = store.metadata("a.txt").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.backend().count("metadata"), 1);
    }

    #[tokio::test]
    async fn test_rename_moves_cache_entry() {
        let store = store();
        let written = store
            .write("old.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        store.rename("old.txt", "new.txt").await.unwrap();

        // Stale source entry must not answer existence
        assert!(!store.has("old.txt").await.unwrap());
        assert_eq!(store.backend().count("has"), 1);

        // Destination inherits the pre-rename record, no backend fetch
        let record = store.metadata("new.txt").await.unwrap();
        assert_eq!(record.path, "new.txt");
        assert_eq!(record.size, written.size);
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_copy_duplicates_entry_independently() {
        let store = store();
        store
            .write("src.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        store.copy("src.txt", "dst.txt").await.unwrap();

        let dst = store.metadata("dst.txt").await.unwrap();
        assert_eq!(dst.path, "dst.txt");
        assert_eq!(dst.size, Some(5));
        assert_eq!(store.backend().count("metadata"), 0);

        // Mutating the copy's metadata must not bleed into the source
        store
            .set_visibility("dst.txt", Visibility::Public)
            .await
            .unwrap();
        let src = store.metadata("src.txt").await.unwrap();
        assert_eq!(src.visibility, Some(Visibility::Private));
    }

    #[tokio::test]
    async fn test_delete_evicts_cache_entry() {
        let store = store();
        store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        store.delete("a.txt").await.unwrap();

        // Existence must be re-checked against the backend
        assert!(!store.has("a.txt").await.unwrap());
        assert_eq!(store.backend().count("has"), 1);
    }

    #[tokio::test]
    async fn test_delete_dir_invalidates_children() {
        let store = store();
        store.write("d/a.txt", b"1", &WriteConfig::default()).await.unwrap();
        store.write("d/b.txt", b"2", &WriteConfig::default()).await.unwrap();

        store.delete_dir("d").await.unwrap();

        // The listing must have been captured before the backend delete
        let calls = store.backend().calls();
        let list_pos = calls.iter().position(|c| c == "list_contents d").unwrap();
        let delete_pos = calls.iter().position(|c| c == "delete_dir d").unwrap();
        assert!(list_pos < delete_pos);

        assert!(!store.has("d/a.txt").await.unwrap());
        assert!(!store.has("d/b.txt").await.unwrap());
        // Both answered by the backend, not stale cache entries
        assert_eq!(store.backend().count("has"), 2);
    }

    #[tokio::test]
    async fn test_create_dir_warms_cache() {
        let store = store();
        store.create_dir("photos", &WriteConfig::default()).await.unwrap();

        let record = store.metadata("photos").await.unwrap();
        assert_eq!(record.path, "photos");
        assert!(record.timestamp.is_some());
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_set_visibility_merges_into_cached_record() {
        let store = store();
        let written = store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();
        assert_eq!(written.visibility, Some(Visibility::Private));

        store.set_visibility("a.txt", Visibility::Public).await.unwrap();

        // Both the earlier size and the new visibility are present
        let record = store.metadata("a.txt").await.unwrap();
        assert_eq!(record.size, Some(5));
        assert_eq!(record.visibility, Some(Visibility::Public));
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_attribute_read_uses_cached_field() {
        let store = store();
        store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        assert_eq!(store.size("a.txt").await.unwrap(), 5);
        assert_eq!(store.mimetype("a.txt").await.unwrap(), "text/plain");
        assert_eq!(store.backend().count("size"), 0);
        assert_eq!(store.backend().count("mimetype"), 0);
    }

    #[tokio::test]
    async fn test_attribute_miss_fetches_and_caches_only_that_attribute() {
        let store = store();
        store
            .backend()
            .inner
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        assert_eq!(store.size("a.txt").await.unwrap(), 5);
        assert_eq!(store.size("a.txt").await.unwrap(), 5);
        // Fetched once, cached thereafter
        assert_eq!(store.backend().count("size"), 1);

        // A cached record with only `size` is not enough to answer a
        // mimetype read; the specific attribute must be fetched.
        assert_eq!(store.mimetype("a.txt").await.unwrap(), "text/plain");
        assert_eq!(store.backend().count("mimetype"), 1);

        // Both attributes have now accumulated in one record
        let record = store.metadata("a.txt").await.unwrap();
        assert_eq!(record.size, Some(5));
        assert_eq!(record.mimetype.as_deref(), Some("text/plain"));
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_timestamp_and_visibility_reads() {
        let store = store();
        store
            .backend()
            .inner
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        let ts = store.timestamp("a.txt").await.unwrap();
        assert!(ts > 0);
        assert_eq!(store.visibility("a.txt").await.unwrap(), Visibility::Private);

        // Second reads come from the cache
        assert_eq!(store.timestamp("a.txt").await.unwrap(), ts);
        assert_eq!(store.visibility("a.txt").await.unwrap(), Visibility::Private);
        assert_eq!(store.backend().count("timestamp"), 1);
        assert_eq!(store.backend().count("visibility"), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_cache_untouched() {
        let store = store();
        store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        // Failed mutation on another path
        assert!(store.copy("ghost.txt", "x.txt").await.unwrap_err().is_not_found());
        assert!(store.delete("ghost.txt").await.unwrap_err().is_not_found());

        // Existing entry still answers from cache
        let record = store.metadata("a.txt").await.unwrap();
        assert_eq!(record.size, Some(5));
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_read_and_listing_always_delegate() {
        let store = store();
        store
            .write("d/a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();

        assert_eq!(store.read("d/a.txt").await.unwrap(), b"hello");
        assert_eq!(store.read("d/a.txt").await.unwrap(), b"hello");
        assert_eq!(store.backend().count("read "), 2);

        store.list_contents("d", false).await.unwrap();
        store.list_contents("d", false).await.unwrap();
        assert_eq!(store.backend().count("list_contents"), 2);
    }

    #[tokio::test]
    async fn test_stream_write_populates_cache() {
        let store = store();
        let mut reader: ByteStream = Box::new(std::io::Cursor::new(b"streamed".to_vec()));
        store
            .write_stream("s.bin", &mut reader, &WriteConfig::default())
            .await
            .unwrap();

        let record = store.metadata("s.bin").await.unwrap();
        assert_eq!(record.size, Some(8));
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_update_merges_metadata() {
        let store = store();
        store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();
        store
            .update("a.txt", b"hello world", &WriteConfig::default())
            .await
            .unwrap();

        let record = store.metadata("a.txt").await.unwrap();
        assert_eq!(record.size, Some(11));
        assert_eq!(store.backend().count("metadata"), 0);
    }

    #[tokio::test]
    async fn test_failing_cache_is_transparent() {
        init_logging();
        let store = CachedStorage::new(RecordingBackend::new(), FailingCache);

        let written = store
            .write("a.txt", b"hello", &WriteConfig::default())
            .await
            .unwrap();
        assert_eq!(written.size, Some(5));

        assert!(store.has("a.txt").await.unwrap());
        let record = store.metadata("a.txt").await.unwrap();
        assert_eq!(record.size, Some(5));
        assert_eq!(store.size("a.txt").await.unwrap(), 5);

        store.rename("a.txt", "b.txt").await.unwrap();
        store.copy("b.txt", "c.txt").await.unwrap();
        store.delete("c.txt").await.unwrap();
        assert!(!store.has("c.txt").await.unwrap());

        // Every read went to the backend since nothing could be cached
        assert_eq!(store.backend().count("metadata"), 1);
        assert_eq!(store.backend().count("size"), 1);
    }
}
