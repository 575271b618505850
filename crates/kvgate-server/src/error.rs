use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid token or time expired")]
    Unauthorized,

    #[error("file not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("blob error: {0}")]
    Blob(#[from] kvgate_blob::BlobError),

    #[error("gate error: {0}")]
    Gate(#[from] kvgate_gate::GateError),

    #[error("store error: {0}")]
    Store(#[from] kvgate_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Unauthorized => "Invalid token or time expired!",
            Self::NotFound => "File not found",
            Self::MethodNotAllowed => "Method not allowed",
            other => {
                error!(error = %other, "request failed");
                "Internal Server Error"
            }
        };
        (status, body).into_response()
    }
}
