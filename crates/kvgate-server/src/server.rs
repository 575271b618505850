use std::sync::Arc;

use kvgate_blob::ChunkedBlobEngine;
use kvgate_gate::{AccessGate, RemoteTokenVerifier, TokenVerifier};
use kvgate_store::{FsKvStore, InMemoryKvStore, KvStore};
use tokio::net::TcpListener;

use crate::config::{ServerConfig, StorageConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// The kvgate HTTP server.
pub struct KvGateServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl std::fmt::Debug for KvGateServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvGateServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KvGateServer {
    /// Build a server from configuration: opens the configured store and
    /// verifies tokens against the configured remote service.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store: Arc<dyn KvStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(InMemoryKvStore::new()),
            StorageConfig::Fs { root } => Arc::new(FsKvStore::open(root)?),
        };
        let verifier = Arc::new(RemoteTokenVerifier::new(
            config.verify_url.clone(),
            config.key.clone(),
        ));
        Self::with_components(config, store, verifier)
    }

    /// Build a server around an explicit store and verifier.
    pub fn with_components(
        config: ServerConfig,
        store: Arc<dyn KvStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> ServerResult<Self> {
        config.validate()?;
        let gate = AccessGate::with_default_stages(config.gate_config(), verifier);
        let engine = ChunkedBlobEngine::new(store, config.chunk_config())?;
        Ok(Self {
            config,
            state: Arc::new(AppState { gate, engine }),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("kvgate listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
