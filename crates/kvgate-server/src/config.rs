use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kvgate_blob::{ChunkConfig, DEFAULT_CHUNK_SIZE};
use kvgate_gate::{GateConfig, DEFAULT_VERIFY_URL};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Where entries are kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local map; everything is lost on restart.
    Memory,
    /// One file per key under `root`.
    Fs { root: PathBuf },
}

/// Everything the server needs at startup.
///
/// Loaded from TOML; every field except `token` has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Shared secret a verified token must carry.
    pub token: String,
    /// Key handed to the verification service to decrypt tokens.
    pub key: String,
    pub verify_url: String,
    pub freshness_window_ms: u64,
    pub chunk_size: usize,
    pub max_body_bytes: usize,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            token: String::new(),
            key: String::new(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            freshness_window_ms: 20_000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_body_bytes: 100 * 1024 * 1024,
            storage: StorageConfig::Memory,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> ServerResult<()> {
        self.gate_config().validate()?;
        self.chunk_config().validate()?;
        if self.verify_url.is_empty() {
            return Err(ServerError::Config("verify_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new(self.token.clone())
            .with_freshness_window(Duration::from_millis(self.freshness_window_ms))
    }

    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunk_size,
        }
    }
}
