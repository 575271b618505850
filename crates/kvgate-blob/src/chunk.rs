use serde::{Deserialize, Serialize};

use crate::error::{BlobError, BlobResult};

/// Fragment size, and the length above which a text value is split.
pub const DEFAULT_CHUNK_SIZE: usize = 786_432;

/// Chunking parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per fragment. Text longer than this is chunked.
    pub chunk_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkConfig {
    pub fn with_chunk_size(chunk_size: usize) -> BlobResult<Self> {
        let config = Self { chunk_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BlobResult<()> {
        if self.chunk_size == 0 {
            return Err(BlobError::Config("chunk size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Key of fragment `index` (1-based): the base key with a decimal suffix.
pub fn fragment_key(key: &str, index: u32) -> String {
    format!("{key}{index}")
}

/// Split `text` into consecutive pieces of at most `chunk_size` characters.
///
/// Cuts fall on character boundaries only. Only the last piece may be
/// shorter. Empty input yields no pieces.
pub fn split_text(text: &str, chunk_size: usize) -> Vec<&str> {
    debug_assert!(chunk_size > 0);
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            pieces.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Body of a pointer entry: describes the chunk set stored under the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRecord {
    pub is_chunked: bool,
    pub total_chunks: u32,
    pub original_content_type: String,
}

impl PointerRecord {
    pub fn new(total_chunks: u32, original_content_type: impl Into<String>) -> Self {
        Self {
            is_chunked: true,
            total_chunks,
            original_content_type: original_content_type.into(),
        }
    }
}

/// What a read of a pointer entry returns in place of the content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub ischunk: bool,
    /// Number of fragments, not bytes.
    pub length: u32,
}

impl From<&PointerRecord> for ChunkSummary {
    fn from(pointer: &PointerRecord) -> Self {
        Self {
            ischunk: pointer.is_chunked,
            length: pointer.total_chunks,
        }
    }
}
