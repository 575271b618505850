use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Longest key, in bytes, any backend accepts.
pub const MAX_KEY_BYTES: usize = 512;

/// Reject empty and oversized keys.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".into()));
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(StoreError::InvalidKey(format!(
            "key is {} bytes, limit is {MAX_KEY_BYTES}",
            key.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EntryMetadata
// ---------------------------------------------------------------------------

/// Structured sidecar stored next to every value.
///
/// Serialized with camelCase names. Flags that are `false` and counters that
/// are absent are omitted, so a plain entry serializes to just its content
/// type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Set only on the pointer entry of a chunked value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_chunk_metadata: bool,
    /// Set on every fragment entry of a chunked value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_chunk: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<u32>,
    /// 1-based position of a fragment within its chunk set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl EntryMetadata {
    /// Metadata for a plain, unchunked entry.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    /// Metadata for fragment `index` (1-based) of a set of `total`.
    pub fn fragment(content_type: impl Into<String>, index: u32, total: u32) -> Self {
        Self {
            content_type: Some(content_type.into()),
            is_chunk: true,
            total_chunks: Some(total),
            chunk_index: Some(index),
            ..Default::default()
        }
    }

    /// Metadata for the pointer entry of a chunk set of `total` fragments.
    pub fn pointer(content_type: impl Into<String>, total: u32) -> Self {
        Self {
            content_type: Some(content_type.into()),
            is_chunk_metadata: true,
            total_chunks: Some(total),
            ..Default::default()
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One key/value/metadata record in the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Bytes,
    pub metadata: EntryMetadata,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>, metadata: EntryMetadata) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata,
        }
    }

    /// Size of the value in bytes.
    pub fn size(&self) -> usize {
        self.value.len()
    }
}
