use std::sync::Arc;

use bytes::Bytes;
use futures::future::try_join_all;
use kvgate_store::{Entry, EntryMetadata, KvStore};
use tracing::{debug, info};

use crate::chunk::{fragment_key, split_text, ChunkConfig, ChunkSummary, PointerRecord};
use crate::content::{
    encode_body, pretty_json, EncodedBody, PayloadKind, APPLICATION_JSON, TEXT_PLAIN,
};
use crate::error::{BlobError, BlobResult};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a write landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// Nothing existed at the key before the write.
    Created,
    /// An entry existed and was overwritten.
    Updated,
    /// The text was split into `total_chunks` fragments behind a pointer.
    Chunked { total_chunks: u32 },
}

/// Result of [`ChunkedBlobEngine::write`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteReport {
    pub key: String,
    pub status: WriteStatus,
}

impl WriteReport {
    /// Whether the key was new. Advisory only: the existence probe is not
    /// atomic with the write, so concurrent writers may both see `true`.
    pub fn created(&self) -> bool {
        matches!(self.status, WriteStatus::Created)
    }
}

/// A value as served to a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobContent {
    pub body: Bytes,
    pub content_type: String,
}

/// Result of [`ChunkedBlobEngine::delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

// ---------------------------------------------------------------------------
// ChunkedBlobEngine
// ---------------------------------------------------------------------------

/// Reads and writes values through a [`KvStore`], splitting long text.
///
/// Text longer than the chunk size is stored as fragments at `key1`..`keyN`
/// plus a pointer entry at `key`. Fragments are written concurrently and the
/// pointer only after every fragment acknowledged, so a visible pointer never
/// refers to fragments that were not written.
///
/// Reads do not reassemble: a pointer reads back as a [`ChunkSummary`].
/// [`Self::fragments`] exposes the fragments for callers that need them.
///
/// Known gaps, kept deliberately: overwriting or deleting a pointer leaves
/// its fragments in place, and a failed fragment write leaves the fragments
/// already written behind.
pub struct ChunkedBlobEngine {
    store: Arc<dyn KvStore>,
    config: ChunkConfig,
}

impl ChunkedBlobEngine {
    pub fn new(store: Arc<dyn KvStore>, config: ChunkConfig) -> BlobResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Store `body` at `key` according to its declared content type.
    pub async fn write(
        &self,
        key: &str,
        body: Bytes,
        declared_content_type: Option<&str>,
    ) -> BlobResult<WriteReport> {
        let encoded = encode_body(body, declared_content_type)?;

        if let Some(pieces) = self.chunk_plan(&encoded) {
            let total_chunks = self.write_chunked(key, &encoded, &pieces).await?;
            return Ok(WriteReport {
                key: key.to_string(),
                status: WriteStatus::Chunked { total_chunks },
            });
        }

        let existed = self.store.exists(key).await?;
        let size = encoded.value.len();
        self.store
            .put(
                key,
                encoded.value,
                EntryMetadata::with_content_type(encoded.content_type),
            )
            .await?;

        let status = if existed {
            WriteStatus::Updated
        } else {
            WriteStatus::Created
        };
        info!(key, bytes = size, ?status, "stored value");
        Ok(WriteReport {
            key: key.to_string(),
            status,
        })
    }

    /// Fragments to write, if this body must be chunked.
    fn chunk_plan<'a>(&self, encoded: &'a EncodedBody) -> Option<Vec<&'a str>> {
        if encoded.kind != PayloadKind::Text || encoded.content_type != TEXT_PLAIN {
            return None;
        }
        let text = encoded.as_text()?;
        // Cheap reject: fewer bytes than the limit means fewer characters too.
        if text.len() <= self.config.chunk_size
            || text.chars().count() <= self.config.chunk_size
        {
            return None;
        }
        Some(split_text(text, self.config.chunk_size))
    }

    async fn write_chunked(
        &self,
        key: &str,
        encoded: &EncodedBody,
        pieces: &[&str],
    ) -> BlobResult<u32> {
        let total = u32::try_from(pieces.len())
            .map_err(|_| BlobError::Config(format!("{} fragments exceed u32", pieces.len())))?;

        let writes = pieces.iter().zip(1..=total).map(|(piece, index)| {
            let fragment = fragment_key(key, index);
            let value = Bytes::copy_from_slice(piece.as_bytes());
            let metadata = EntryMetadata::fragment(TEXT_PLAIN, index, total);
            async move { self.store.put(&fragment, value, metadata).await }
        });
        try_join_all(writes).await?;
        debug!(key, total, "fragments written");

        let pointer = PointerRecord::new(total, encoded.content_type.clone());
        let pointer_body = serde_json::to_vec(&pointer).map_err(|e| BlobError::CorruptPointer {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.store
            .put(
                key,
                Bytes::from(pointer_body),
                EntryMetadata::pointer(APPLICATION_JSON, total),
            )
            .await?;

        info!(key, total, bytes = encoded.value.len(), "stored chunked value");
        Ok(total)
    }

    /// Read the value at `key`. `Ok(None)` when nothing is stored there.
    pub async fn read(&self, key: &str) -> BlobResult<Option<BlobContent>> {
        let Some(entry) = self.store.get_with_metadata(key).await? else {
            debug!(key, "read miss");
            return Ok(None);
        };

        let content_type = entry
            .metadata
            .content_type()
            .unwrap_or(TEXT_PLAIN)
            .to_string();

        if entry.metadata.is_chunk_metadata {
            let pointer = decode_pointer(&entry)?;
            if pointer.is_chunked {
                let summary = serde_json::to_vec(&ChunkSummary::from(&pointer)).map_err(|e| {
                    BlobError::CorruptPointer {
                        key: key.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                return Ok(Some(BlobContent {
                    body: Bytes::from(summary),
                    content_type: TEXT_PLAIN.to_string(),
                }));
            }
            return Ok(Some(BlobContent {
                body: entry.value,
                content_type,
            }));
        }

        let body = if content_type == APPLICATION_JSON {
            pretty_json(entry.value)
        } else {
            entry.value
        };
        Ok(Some(BlobContent { body, content_type }))
    }

    /// Delete the single entry at `key`. Fragments of a pointer stay behind.
    pub async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        if !self.store.exists(key).await? {
            return Ok(DeleteOutcome::NotFound);
        }
        self.store.delete(key).await?;
        info!(key, "deleted value");
        Ok(DeleteOutcome::Deleted)
    }

    /// Fetch the fragments of the chunk set at `key`, in index order.
    ///
    /// Not used by [`Self::read`]. Fails with [`BlobError::NotChunked`] when
    /// `key` holds no pointer, and [`BlobError::BadFragment`] when a fragment
    /// is missing or carries the wrong index.
    pub async fn fragments(&self, key: &str) -> BlobResult<Vec<Entry>> {
        let entry = self
            .store
            .get_with_metadata(key)
            .await?
            .ok_or_else(|| BlobError::NotChunked(key.to_string()))?;
        if !entry.metadata.is_chunk_metadata {
            return Err(BlobError::NotChunked(key.to_string()));
        }
        let pointer = decode_pointer(&entry)?;
        if !pointer.is_chunked {
            return Err(BlobError::NotChunked(key.to_string()));
        }

        let reads = (1..=pointer.total_chunks).map(|index| self.fragment(key, index));
        try_join_all(reads).await
    }

    async fn fragment(&self, key: &str, index: u32) -> BlobResult<Entry> {
        match self.store.get_with_metadata(&fragment_key(key, index)).await? {
            Some(f) if f.metadata.is_chunk && f.metadata.chunk_index == Some(index) => Ok(f),
            _ => Err(BlobError::BadFragment {
                key: key.to_string(),
                index,
            }),
        }
    }
}

fn decode_pointer(entry: &Entry) -> BlobResult<PointerRecord> {
    serde_json::from_slice(&entry.value).map_err(|e| BlobError::CorruptPointer {
        key: entry.key.clone(),
        reason: e.to_string(),
    })
}

impl std::fmt::Debug for ChunkedBlobEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedBlobEngine")
            .field("chunk_size", &self.config.chunk_size)
            .finish()
    }
}
