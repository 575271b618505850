use async_trait::async_trait;
use bytes::Bytes;

use crate::entry::{Entry, EntryMetadata};
use crate::error::StoreResult;

/// A key-value backend with per-key metadata.
///
/// All implementations must satisfy these invariants:
/// - Last write wins: `put` replaces any prior value and metadata at the key.
/// - A `put` that returned `Ok` is visible to every later `get`.
/// - No cross-key atomicity is promised.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Read the value and its metadata at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get_with_metadata(&self, key: &str) -> StoreResult<Option<Entry>>;

    /// Write `value` and `metadata` at `key`, replacing whatever was there.
    async fn put(&self, key: &str, value: Bytes, metadata: EntryMetadata) -> StoreResult<()>;

    /// Remove the entry at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Check whether an entry exists at `key`.
    ///
    /// Default implementation reads the value. Backends may override with a
    /// cheaper probe.
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
