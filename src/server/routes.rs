//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the router. Every endpoint answers both with and without the `/api` prefix.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/scrape", post(handlers::scrape))
        .route("/scrape", post(handlers::scrape))
        .route("/api/vehicles", get(handlers::vehicles))
        .route("/vehicles", get(handlers::vehicles))
        .route("/api/update-listings", post(handlers::update_listings))
        .route("/update-listings", post(handlers::update_listings))
        .route("/api/status", get(handlers::status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
