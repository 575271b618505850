//! Key-value backend for kvgate.
//!
//! Every value served by kvgate lives in a key-value backend as an [`Entry`]:
//! an opaque byte value plus a small [`EntryMetadata`] sidecar carrying the
//! content type and, for chunked values, the chunk-set bookkeeping.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsKvStore`] -- one file per key: a JSON metadata line, then the value
//!
//! # Design Rules
//!
//! 1. Last write wins. A `put` replaces both value and metadata.
//! 2. No transactions: callers that need ordering issue writes in order.
//! 3. The store never interprets values or metadata.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod entry;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use entry::{validate_key, Entry, EntryMetadata, MAX_KEY_BYTES};
pub use error::{StoreError, StoreResult};
pub use fs::FsKvStore;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
