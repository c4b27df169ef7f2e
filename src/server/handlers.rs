//! API endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::AppState;
use crate::crawl::{CrawlError, CrawlPhase};

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Crawl(CrawlError::AlreadyRunning) => StatusCode::CONFLICT,
            ApiError::Crawl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "detail": format!("Scrape failed: {}", self) });
        (status, Json(body)).into_response()
    }
}

/// Optional page bound for a single crawl.
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub pages: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub found: usize,
    pub processed: usize,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub urls: Vec<String>,
}

/// Liveness message.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": format!("Auction Scout API v{}", env!("CARGO_PKG_VERSION")),
        "status": "running",
    }))
}

/// Run a full crawl and wait for it to finish.
pub async fn scrape(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let report = state.crawler.run(params.pages).await?;

    Ok(Json(ScrapeResponse {
        message: "Scraping and processing completed successfully.".to_string(),
        found: report.found,
        processed: report.processed,
        status: "success".to_string(),
    }))
}

/// Records from the latest completed crawl.
pub async fn vehicles(State(state): State<AppState>) -> impl IntoResponse {
    let vehicles = state.store.snapshot().await;
    info!("Returning {} vehicles", vehicles.len());
    Json(vehicles)
}

/// Refresh the volatile fields of the given lots.
pub async fn update_listings(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> impl IntoResponse {
    Json(state.crawler.update_listings(&request.urls).await)
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: CrawlPhase,
    pub vehicles: usize,
    pub fetcher: &'static str,
}

/// Crawl phase and store size.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        phase: state.crawler.phase().await,
        vehicles: state.store.len().await,
        fetcher: state.crawler.fetcher_name(),
    })
}
