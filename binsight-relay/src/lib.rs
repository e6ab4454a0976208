//! binsight-relay library
//!
//! Stateless forwarding endpoint between the upload page and the external
//! image-classification service. Each request is an independent
//! transaction: no queuing, no correlation, no retry.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

pub use crate::error::{ApiResult, RelayError};
pub use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Client for the one configured classification endpoint
    pub upstream: Arc<UpstreamClient>,
    /// Request body limit applied to uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(upstream: UpstreamClient, max_upload_bytes: usize) -> Self {
        Self {
            upstream: Arc::new(upstream),
            max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/analyze", post(api::analyze))
        .route("/api/reconcile", post(api::reconcile_payload))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        // The page may be served from elsewhere during development
        .layer(CorsLayer::permissive())
        .with_state(state)
}
