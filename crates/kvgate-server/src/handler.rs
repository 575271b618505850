use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use kvgate_blob::{ChunkedBlobEngine, DeleteOutcome, WriteStatus};
use kvgate_gate::{AccessDecision, AccessGate};
use tracing::debug;

use crate::error::{ServerError, ServerResult};
use crate::landing::landing_page;

/// Shared, immutable per-process state handed to every request.
pub struct AppState {
    pub gate: AccessGate,
    pub engine: ChunkedBlobEngine,
}

/// Storage key for a request: the URL path without its leading slashes.
///
/// The path is used as it appears on the wire, percent-escapes included.
pub fn storage_key(uri: &Uri) -> &str {
    uri.path().trim_start_matches('/')
}

/// Single entry point for every method and path.
///
/// Order matters: the landing page wins over everything, then the gate, then
/// method dispatch.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = storage_key(&uri);
    let token = params.get("token").map(String::as_str).unwrap_or_default();
    if token.is_empty() || key.is_empty() {
        return landing_page();
    }

    if let AccessDecision::Deny { reason } = state.gate.authorize_now(token).await {
        debug!(key, %reason, "request rejected by gate");
        return ServerError::Unauthorized.into_response();
    }

    let result = match method {
        Method::GET => handle_get(&state, key).await,
        Method::PUT => handle_put(&state, key, &headers, body).await,
        Method::DELETE => handle_delete(&state, key).await,
        _ => Err(ServerError::MethodNotAllowed),
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn handle_get(state: &AppState, key: &str) -> ServerResult<Response> {
    let content = state.engine.read(key).await?.ok_or(ServerError::NotFound)?;
    let content_type = HeaderValue::from_str(&content.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok(([(header::CONTENT_TYPE, content_type)], content.body).into_response())
}

async fn handle_put(
    state: &AppState,
    key: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let report = state.engine.write(key, body, declared).await?;

    let message = match report.status {
        WriteStatus::Created => format!("File {key} created successfully"),
        WriteStatus::Updated => format!("File {key} updated successfully"),
        WriteStatus::Chunked { .. } => format!("File {key} chunked and stored successfully"),
    };
    Ok(message.into_response())
}

async fn handle_delete(state: &AppState, key: &str) -> ServerResult<Response> {
    match state.engine.delete(key).await? {
        DeleteOutcome::Deleted => Ok(format!("File {key} deleted successfully").into_response()),
        DeleteOutcome::NotFound => Err(ServerError::NotFound),
    }
}
