use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router: every method on every path goes to the dispatcher.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", any(handler::dispatch))
        .route("/*path", any(handler::dispatch))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
