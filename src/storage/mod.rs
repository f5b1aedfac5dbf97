//! Backend store contract and data model
//!
//! Defines the file-storage abstraction wrapped by the caching adapter,
//! plus an in-memory reference implementation.

pub mod backend;
pub mod errors;
pub mod memory;
pub mod types;

pub use backend::{ByteStream, ProtectedUrl, PublicUrl, StorageBackend};
pub use errors::StorageError;
pub use memory::MemoryBackend;
pub use types::{Metadata, MetadataKind, Visibility, WriteConfig};
