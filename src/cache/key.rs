//! Cache key derivation

use sha1::{Digest, Sha1};

/// Derive the cache key for a file path
///
/// Deterministic one-way hash of the path, hex-encoded. Content-insensitive;
/// two distinct paths share a key only on a hash collision, negligible for
/// practical path spaces.
pub fn cache_key(path: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(path.as_bytes());
    format!("{:x}", hasher.finalize())
}
