//! URL capability passthrough
//!
//! Public and protected URL generation are capabilities of the wrapped
//! backend, not of the cache. The adapter forwards each capability when
//! its backend has it, so a cached public-access store still exposes
//! `public_url` and a cached protected-access store `protected_url`.
//! Nothing about URLs is cached.

use async_trait::async_trait;

use crate::cache::MetadataCache;
use crate::storage::{ProtectedUrl, PublicUrl, StorageBackend, StorageError};

use super::cached::CachedStorage;

#[async_trait]
impl<B, C> PublicUrl for CachedStorage<B, C>
where
    B: StorageBackend + PublicUrl,
    C: MetadataCache,
{
    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        self.backend().public_url(path).await
    }
}

#[async_trait]
impl<B, C> ProtectedUrl for CachedStorage<B, C>
where
    B: StorageBackend + ProtectedUrl,
    C: MetadataCache,
{
    async fn protected_url(&self, path: &str) -> Result<String, StorageError> {
        self.backend().protected_url(path).await
    }
}
