//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
///
/// `body_limit` caps request bodies in bytes (uploads and download requests).
pub fn create_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/download", post(handlers::download))
        .route("/api/upload", post(handlers::upload))
        .route("/debug/memory", get(handlers::memory))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
