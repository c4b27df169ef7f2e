//! HTTP API over the crawler and its result store.

mod handlers;
mod routes;

pub use handlers::{ScrapeResponse, UpdateRequest};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::crawl::Crawler;
use crate::store::ResultStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<Crawler>,
    pub store: ResultStore,
}

impl AppState {
    pub fn new(crawler: Crawler) -> Self {
        let store = crawler.store().clone();
        Self {
            crawler: Arc::new(crawler),
            store,
        }
    }
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
