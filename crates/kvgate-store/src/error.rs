/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is empty or exceeds [`crate::MAX_KEY_BYTES`].
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Metadata sidecar could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused or failed the operation.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
