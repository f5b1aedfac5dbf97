//! Storage data model
//!
//! Metadata records are partial by design: different operations report
//! different fields, and a record accumulates attributes over time as
//! results are merged into it.

use serde::{Deserialize, Serialize};

/// Visibility of a stored file as exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Per-write configuration passed through to the backend store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteConfig {
    /// Visibility to apply to the written file (backend default if None)
    pub visibility: Option<Visibility>,
    /// Explicit mimetype (backend guesses from the path if None)
    pub mimetype: Option<String>,
}

/// The recognized metadata attributes
///
/// Per-attribute reads resolve the matching backend accessor through a
/// `match` on this enum rather than any runtime name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Size,
    Mimetype,
    Timestamp,
    Visibility,
}

impl MetadataKind {
    /// Attribute name for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKind::Size => "size",
            MetadataKind::Mimetype => "mimetype",
            MetadataKind::Timestamp => "timestamp",
            MetadataKind::Visibility => "visibility",
        }
    }
}

/// Partial metadata record for one path
///
/// Any subset of the attributes may be present. Records at the same path
/// are combined with [`Metadata::merge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Full path within the backend store
    pub path: String,
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    /// Last-modified time, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Visibility of the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl Metadata {
    /// Create an empty record for `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: None,
            mimetype: None,
            timestamp: None,
            visibility: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Union-merge `newer` into this record
    ///
    /// Attributes present in `newer` overwrite the same-named attributes
    /// here; attributes absent from `newer` are preserved. The path is
    /// not touched.
    pub fn merge(&mut self, newer: &Metadata) {
        if newer.size.is_some() {
            self.size = newer.size;
        }
        if let Some(mimetype) = &newer.mimetype {
            self.mimetype = Some(mimetype.clone());
        }
        if newer.timestamp.is_some() {
            self.timestamp = newer.timestamp;
        }
        if newer.visibility.is_some() {
            self.visibility = newer.visibility;
        }
    }

    /// True when no attribute besides the path is set
    pub fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.mimetype.is_none()
            && self.timestamp.is_none()
            && self.visibility.is_none()
    }
}
