//! Chunked-blob engine for kvgate.
//!
//! Sits between the HTTP dispatcher and the key-value backend and owns the
//! storage protocol:
//!
//! - **Encoding** ([`content`]): JSON bodies are validated and compacted,
//!   `text/*` bodies are stored as `text/plain`, anything else is opaque.
//! - **Chunking** ([`chunk`]): `text/plain` values longer than the chunk size
//!   (786432 characters by default) are split into fragments stored at
//!   `key1`..`keyN`, with a pointer entry at `key` describing the set.
//! - **Reading** ([`engine`]): pointers read back as a short summary
//!   (`{"ischunk":true,"length":N}`), JSON reads back pretty-printed.
//!
//! Only this crate sets the chunk bookkeeping fields of
//! [`kvgate_store::EntryMetadata`].

pub mod chunk;
pub mod content;
pub mod engine;
pub mod error;

pub use chunk::{fragment_key, split_text, ChunkConfig, ChunkSummary, PointerRecord, DEFAULT_CHUNK_SIZE};
pub use content::{encode_body, EncodedBody, PayloadKind};
pub use engine::{BlobContent, ChunkedBlobEngine, DeleteOutcome, WriteReport, WriteStatus};
pub use error::{BlobError, BlobResult};
