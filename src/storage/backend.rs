//! Backend store contract
//!
//! The authoritative file-storage abstraction being wrapped. A real
//! implementation talks to a remote object store; [`super::MemoryBackend`]
//! implements the same contract in memory for tests and local use.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::errors::StorageError;
use super::types::{Metadata, Visibility, WriteConfig};

/// Boxed byte stream returned by `read_stream`
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// The file-storage contract
///
/// Mutations that produce metadata return the record the backend reported
/// for the affected path. All methods take `&self`; implementations are
/// expected to be safe for concurrent callers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write `contents` to `path`, creating or replacing the file
    async fn write(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError>;

    /// Write from a byte stream to `path`
    async fn write_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError>;

    /// Replace the contents of an existing file
    async fn update(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError>;

    /// Replace the contents of an existing file from a byte stream
    async fn update_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError>;

    /// Move a file to a new path
    async fn rename(&self, path: &str, newpath: &str) -> Result<(), StorageError>;

    /// Copy a file to a new path, leaving the source in place
    async fn copy(&self, path: &str, newpath: &str) -> Result<(), StorageError>;

    /// Delete a file
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Delete a directory and everything under it
    async fn delete_dir(&self, dirname: &str) -> Result<(), StorageError>;

    /// Create a directory
    async fn create_dir(
        &self,
        dirname: &str,
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError>;

    /// Change a file's visibility
    async fn set_visibility(
        &self,
        path: &str,
        visibility: Visibility,
    ) -> Result<Metadata, StorageError>;

    /// Whether a file or directory exists at `path`
    async fn has(&self, path: &str) -> Result<bool, StorageError>;

    /// Read a file's full contents
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Read a file as a byte stream
    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError>;

    /// List the contents of a directory
    ///
    /// With `recursive` set, descendants at any depth are included.
    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<Metadata>, StorageError>;

    /// Fetch the full metadata record for `path`
    async fn metadata(&self, path: &str) -> Result<Metadata, StorageError>;

    /// Fetch the size of `path` in bytes
    async fn size(&self, path: &str) -> Result<u64, StorageError>;

    /// Fetch the mimetype of `path`
    async fn mimetype(&self, path: &str) -> Result<String, StorageError>;

    /// Fetch the last-modified timestamp of `path`
    async fn timestamp(&self, path: &str) -> Result<i64, StorageError>;

    /// Fetch the visibility of `path`
    async fn visibility(&self, path: &str) -> Result<Visibility, StorageError>;
}

/// Capability of backends that can mint publicly accessible URLs
#[async_trait]
pub trait PublicUrl: Send + Sync {
    /// URL at which `path` is publicly reachable
    async fn public_url(&self, path: &str) -> Result<String, StorageError>;
}

/// Capability of backends that can mint access-protected URLs
#[async_trait]
pub trait ProtectedUrl: Send + Sync {
    /// Signed or otherwise protected URL for `path`
    async fn protected_url(&self, path: &str) -> Result<String, StorageError>;
}
