use anyhow::Result;
use auction_scout::config::{Cli, FetcherKind};
use auction_scout::scrapers::{BrowserFetcher, HttpFetcher, PageFetcher};
use auction_scout::server::{self, AppState};
use auction_scout::{Crawler, ResultStore};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Auction Scout v{}", env!("CARGO_PKG_VERSION"));

    let fetcher: Arc<dyn PageFetcher> = match cli.fetcher_kind() {
        FetcherKind::Http => Arc::new(HttpFetcher::with_timeout(cli.timeout())?),
        FetcherKind::Browser => Arc::new(BrowserFetcher::new()?),
    };

    let params = cli.search_params();
    info!(
        "Crawling {} with {:?}, up to {} lot pages",
        params.origin, params.pages, params.detail_limit
    );

    let crawler = Crawler::new(fetcher, params, ResultStore::new())?;
    server::serve(AppState::new(crawler), &cli.host, cli.port).await
}
