//! In-memory backend store
//!
//! Implements the full [`StorageBackend`] contract against a process-local
//! map. Used as the test substrate and as executable documentation of the
//! contract's semantics.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::backend::{ByteStream, ProtectedUrl, PublicUrl, StorageBackend};
use super::errors::StorageError;
use super::types::{Metadata, Visibility, WriteConfig};

/// One stored object (file or directory marker)
#[derive(Debug, Clone)]
struct Object {
    contents: Vec<u8>,
    mimetype: String,
    timestamp: i64,
    visibility: Visibility,
    is_dir: bool,
}

/// In-memory object store
pub struct MemoryBackend {
    objects: Mutex<BTreeMap<String, Object>>,
    base_url: String,
}

/// Current time as seconds since the Unix epoch
fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Guess a mimetype from the path extension
fn guess_mimetype(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "txt" | "md" => "text/plain",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_base_url("memory://bucket")
    }

    /// Create a backend whose URLs are rooted at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Build the metadata record for a stored object
    fn record(path: &str, object: &Object) -> Metadata {
        let mut record = Metadata::new(path)
            .with_timestamp(object.timestamp)
            .with_visibility(object.visibility);
        if !object.is_dir {
            record = record
                .with_size(object.contents.len() as u64)
                .with_mimetype(object.mimetype.clone());
        }
        record
    }

    /// Look up an object and map it through `f`, or NotFound
    fn with_object<T>(&self, path: &str, f: impl FnOnce(&Object) -> T) -> Result<T, StorageError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(path)
            .map(f)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn store_file(&self, path: &str, contents: Vec<u8>, config: &WriteConfig, keep_visibility: Option<Visibility>) -> Metadata {
        let object = Object {
            mimetype: config
                .mimetype
                .clone()
                .unwrap_or_else(|| guess_mimetype(path).to_string()),
            timestamp: now_timestamp(),
            visibility: config
                .visibility
                .or(keep_visibility)
                .unwrap_or(Visibility::Private),
            is_dir: false,
            contents,
        };
        let record = Self::record(path, &object);
        self.objects.lock().unwrap().insert(path.to_string(), object);
        record
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn write(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        Ok(self.store_file(path, contents.to_vec(), config, None))
    }

    async fn write_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await?;
        Ok(self.store_file(path, contents, config, None))
    }

    async fn update(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let existing = self.with_object(path, |object| object.visibility)?;
        Ok(self.store_file(path, contents.to_vec(), config, Some(existing)))
    }

    async fn update_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let existing = self.with_object(path, |object| object.visibility)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await?;
        Ok(self.store_file(path, contents, config, Some(existing)))
    }

    async fn rename(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .remove(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        objects.insert(newpath.to_string(), object);
        Ok(())
    }

    async fn copy(&self, path: &str, newpath: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        objects.insert(newpath.to_string(), object);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().unwrap();
        objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete_dir(&self, dirname: &str) -> Result<(), StorageError> {
        let prefix = format!("{}/", dirname.trim_end_matches('/'));
        let mut objects = self.objects.lock().unwrap();
        objects.remove(dirname);
        objects.retain(|path, _| !path.starts_with(&prefix));
        Ok(())
    }

    async fn create_dir(
        &self,
        dirname: &str,
        config: &WriteConfig,
    ) -> Result<Metadata, StorageError> {
        let object = Object {
            contents: Vec::new(),
            mimetype: String::new(),
            timestamp: now_timestamp(),
            visibility: config.visibility.unwrap_or(Visibility::Private),
            is_dir: true,
        };
        let record = Self::record(dirname, &object);
        self.objects
            .lock()
            .unwrap()
            .insert(dirname.to_string(), object);
        Ok(record)
    }

    async fn set_visibility(
        &self,
        path: &str,
        visibility: Visibility,
    ) -> Result<Metadata, StorageError> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        object.visibility = visibility;
        Ok(Metadata::new(path).with_visibility(visibility))
    }

    async fn has(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.objects.lock().unwrap().contains_key(path))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.with_object(path, |object| object.contents.clone())
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        let contents = self.with_object(path, |object| object.contents.clone())?;
        Ok(Box::new(std::io::Cursor::new(contents)))
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<Metadata>, StorageError> {
        let prefix = if directory.is_empty() {
            String::new()
        } else {
            format!("{}/", directory.trim_end_matches('/'))
        };

        let objects = self.objects.lock().unwrap();
        let entries = objects
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix) && path.len() > prefix.len())
            .filter(|(path, _)| recursive || !path[prefix.len()..].contains('/'))
            .map(|(path, object)| Self::record(path, object))
            .collect();
        Ok(entries)
    }

    async fn metadata(&self, path: &str) -> Result<Metadata, StorageError> {
        self.with_object(path, |object| Self::record(path, object))
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        self.with_object(path, |object| object.contents.len() as u64)
    }

    async fn mimetype(&self, path: &str) -> Result<String, StorageError> {
        self.with_object(path, |object| object.mimetype.clone())
    }

    async fn timestamp(&self, path: &str) -> Result<i64, StorageError> {
        self.with_object(path, |object| object.timestamp)
    }

    async fn visibility(&self, path: &str) -> Result<Visibility, StorageError> {
        self.with_object(path, |object| object.visibility)
    }
}

#[async_trait]
impl PublicUrl for MemoryBackend {
    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        Ok(format!("{}/{}", self.base_url, path))
    }
}

#[async_trait]
impl ProtectedUrl for MemoryBackend {
    async fn protected_url(&self, path: &str) -> Result<String, StorageError> {
        let mut hasher = Sha1::new();
        hasher.update(self.base_url.as_bytes());
        hasher.update(path.as_bytes());
        let sig = format!("{:x}", hasher.finalize());
        Ok(format!("{}/{}?sig={}", self.base_url, path, sig))
    }
}
