use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::entry::{validate_key, Entry, EntryMetadata};
use crate::error::StoreResult;
use crate::traits::KvStore;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock`;
/// values are `Bytes`, so reads are cheap reference-count bumps.
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, (Bytes, EntryMetadata)>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Remove all entries from the store.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        validate_key(key)?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).map(|(value, _)| value.clone()))
    }

    async fn get_with_metadata(&self, key: &str) -> StoreResult<Option<Entry>> {
        validate_key(key)?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map
            .get(key)
            .map(|(value, metadata)| Entry::new(key, value.clone(), metadata.clone())))
    }

    async fn put(&self, key: &str, value: Bytes, metadata: EntryMetadata) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_string(), (value, metadata));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        Ok(self.entries.read().expect("lock poisoned").contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
