use kvgate_store::StoreError;

/// Errors from chunked-blob operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// A body declared as `application/json` did not parse.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The pointer entry at `key` could not be decoded.
    #[error("corrupt chunk pointer at {key}: {reason}")]
    CorruptPointer { key: String, reason: String },

    /// The entry at `key` is not the pointer of a chunk set.
    #[error("{0} is not a chunked value")]
    NotChunked(String),

    /// A fragment the pointer promises is absent or mislabelled.
    #[error("fragment {index} of {key} is missing or inconsistent")]
    BadFragment { key: String, index: u32 },

    /// The chunk configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The key-value backend failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
