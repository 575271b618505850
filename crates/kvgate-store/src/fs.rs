use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::entry::{validate_key, Entry, EntryMetadata};
use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Hex characters per path component; keeps file names well under 255 bytes.
const SEGMENT_LEN: usize = 128;

const ENTRY_EXTENSION: &str = "entry";

/// Filesystem-backed key-value store.
///
/// Each key maps to one file under `root`. The file holds the metadata as a
/// single JSON line followed by the raw value bytes, so value and metadata
/// are replaced together by one atomic rename.
///
/// Keys are hex-encoded and split into fixed-width directory components:
/// `root/{hex[0..128]}/{hex[128..256]}/.../{last}.entry`.
pub struct FsKvStore {
    root: PathBuf,
}

impl FsKvStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the entry file for `key`.
    pub fn entry_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        let encoded = hex::encode(key.as_bytes());
        let segments: Vec<&str> = encoded
            .as_bytes()
            .chunks(SEGMENT_LEN)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect();

        let mut path = self.root.clone();
        let (last, dirs) = segments
            .split_last()
            .ok_or_else(|| StoreError::InvalidKey("key must not be empty".into()))?;
        for dir in dirs {
            path.push(dir);
        }
        path.push(format!("{last}.{ENTRY_EXTENSION}"));
        Ok(path)
    }

    async fn read_entry_file(&self, key: &str) -> StoreResult<Option<(Bytes, EntryMetadata)>> {
        let path = self.entry_path(key)?;
        let raw = match fs::read(&path).await {
            Ok(raw) => Bytes::from(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        decode_entry_file(key, raw).map(Some)
    }
}

/// Split an entry file into its value and metadata header.
fn decode_entry_file(key: &str, raw: Bytes) -> StoreResult<(Bytes, EntryMetadata)> {
    let newline = raw.iter().position(|b| *b == b'\n').ok_or_else(|| {
        StoreError::Serialization(format!("entry file for {key} has no metadata header"))
    })?;
    let metadata: EntryMetadata = serde_json::from_slice(&raw[..newline])?;
    Ok((raw.slice(newline + 1..), metadata))
}

fn encode_entry_file(value: &[u8], metadata: &EntryMetadata) -> StoreResult<Vec<u8>> {
    let mut out = serde_json::to_vec(metadata)?;
    out.reserve(value.len() + 1);
    out.push(b'\n');
    out.extend_from_slice(value);
    Ok(out)
}

#[async_trait]
impl KvStore for FsKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.read_entry_file(key).await?.map(|(value, _)| value))
    }

    async fn get_with_metadata(&self, key: &str) -> StoreResult<Option<Entry>> {
        Ok(self
            .read_entry_file(key)
            .await?
            .map(|(value, metadata)| Entry::new(key, value, metadata)))
    }

    async fn put(&self, key: &str, value: Bytes, metadata: EntryMetadata) -> StoreResult<()> {
        let path = self.entry_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = encode_entry_file(&value, &metadata)?;
        let tmp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::now_v7()));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &path).await?;
        debug!(key, bytes = value.len(), "fs store put");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "fs store delete");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let path = self.entry_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

impl std::fmt::Debug for FsKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsKvStore").field("root", &self.root).finish()
    }
}
