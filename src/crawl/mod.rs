//! Crawl orchestration: search pages first, then a bounded run over lot pages.

pub mod pacer;

pub use pacer::RequestPacer;

use crate::extract::{collect_lot_links, parse_vehicle, FieldTable, LinkRules};
use crate::models::{ListingUpdate, VehicleRecord};
use crate::scrapers::{PageFetcher, PageLimit, SearchParams};
use crate::store::ResultStore;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("a crawl is already running")]
    AlreadyRunning,
    #[error("no vehicles found on {url}; the site may be blocking requests or changed its layout")]
    Blocked { url: String },
    #[error("first search page {url} could not be fetched: {source:#}")]
    FirstPageFailed {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Where a crawl currently is; a run always ends in `Done` or `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    Idle,
    CollectingLinks,
    FetchingDetails,
    Done,
    Failed,
}

/// Outcome of one successful crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Unique lot links collected from the search pages
    pub found: usize,
    /// Records written to the store
    pub processed: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub details_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CrawlStats {
    pages_fetched: usize,
    pages_failed: usize,
    details_failed: usize,
}

/// Drives search page collection and lot page parsing, one request at a time
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    params: SearchParams,
    fields: FieldTable,
    link_rules: LinkRules,
    store: ResultStore,
    phase: RwLock<CrawlPhase>,
    running: Mutex<()>,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        params: SearchParams,
        store: ResultStore,
    ) -> Result<Self, CrawlError> {
        let origin = Url::parse(&params.origin)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", params.origin, e)))?;

        Ok(Self {
            fetcher,
            params,
            fields: FieldTable::default(),
            link_rules: LinkRules::new(origin),
            store,
            phase: RwLock::new(CrawlPhase::Idle),
            running: Mutex::new(()),
        })
    }

    /// Use a different label-to-field table for lot pages
    pub fn with_fields(mut self, fields: FieldTable) -> Self {
        self.fields = fields;
        self
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    pub async fn phase(&self) -> CrawlPhase {
        *self.phase.read().await
    }

    async fn set_phase(&self, phase: CrawlPhase) {
        debug!("Crawl phase -> {:?}", phase);
        *self.phase.write().await = phase;
    }

    /// Run a full crawl and replace the store with its results.
    ///
    /// `pages` overrides the configured page bound for this run. On failure
    /// the store keeps the previous crawl's records.
    pub async fn run(&self, pages: Option<usize>) -> Result<CrawlReport, CrawlError> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| CrawlError::AlreadyRunning)?;

        info!("Starting scrape process using {} fetcher...", self.fetcher.name());
        let result = self.crawl(pages).await;

        match &result {
            Ok(report) => {
                self.set_phase(CrawlPhase::Done).await;
                info!(
                    "Scrape complete: {} found, {} processed",
                    report.found, report.processed
                );
            }
            Err(e) => {
                self.set_phase(CrawlPhase::Failed).await;
                error!("Scrape process failed: {}", e);
            }
        }
        result
    }

    async fn crawl(&self, pages: Option<usize>) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let mut stats = CrawlStats::default();

        let limit = pages.map(PageLimit::Fixed).unwrap_or(self.params.pages);

        self.set_phase(CrawlPhase::CollectingLinks).await;
        let links = self.collect_links(limit, &mut stats).await?;
        info!("Scraping complete. Total unique links found: {}", links.len());

        self.set_phase(CrawlPhase::FetchingDetails).await;
        let vehicles = self.fetch_details(&links, &mut stats).await;

        let processed = self.store.replace(vehicles).await;
        info!("Processed details for {} vehicles.", processed);

        Ok(CrawlReport {
            found: links.len(),
            processed,
            pages_fetched: stats.pages_fetched,
            pages_failed: stats.pages_failed,
            details_failed: stats.details_failed,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn collect_links(
        &self,
        limit: PageLimit,
        stats: &mut CrawlStats,
    ) -> Result<Vec<String>, CrawlError> {
        let pacer = RequestPacer::new(self.params.page_delay);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for page in 1..=limit.max_pages() {
            let url = self
                .params
                .index_url(page)
                .map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;

            pacer.acquire().await;
            info!("Scraping page {}: {}", page, url);

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    stats.pages_failed += 1;
                    error!("Error scraping page {}: {:#}", page, e);
                    if page == 1 && self.params.strict {
                        return Err(CrawlError::FirstPageFailed { url, source: e });
                    }
                    continue;
                }
            };
            stats.pages_fetched += 1;

            let page_links = self.links_on_page(&html, page);
            if page_links.is_empty() {
                if page == 1 {
                    error!("No links found on the first page. Check if the site blocked us or changed structure.");
                    if self.params.strict {
                        return Err(CrawlError::Blocked { url });
                    }
                    break;
                }
                if matches!(limit, PageLimit::UntilEmpty { .. }) {
                    info!("Page {} has no lots, stopping pagination", page);
                    break;
                }
            }

            let before = links.len();
            for link in page_links {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
            info!(
                "Page {}: Found {} new links. Total unique: {}",
                page,
                links.len() - before,
                links.len()
            );
        }

        Ok(links)
    }

    fn links_on_page(&self, html: &str, page: usize) -> BTreeSet<String> {
        let document = Html::parse_document(html);
        let links = collect_lot_links(&document, &self.link_rules);

        if page == 1 {
            debug!(
                "First 500 chars of page 1: {}",
                html.chars().take(500).collect::<String>()
            );
            if links.is_empty() {
                let title = Selector::parse("title")
                    .ok()
                    .and_then(|s| document.select(&s).next().map(crate::extract::element_text));
                warn!("Page title: {:?}", title);
            }
        }
        links
    }

    async fn fetch_details(&self, links: &[String], stats: &mut CrawlStats) -> Vec<VehicleRecord> {
        let pacer = RequestPacer::new(self.params.detail_delay);
        let limited = &links[..links.len().min(self.params.detail_limit)];
        let mut vehicles = Vec::with_capacity(limited.len());

        for (i, url) in limited.iter().enumerate() {
            pacer.acquire().await;
            info!("Processing vehicle {}/{}: {}", i + 1, limited.len(), url);

            match self.fetcher.fetch(url).await {
                Ok(html) => {
                    let vehicle = self.parse_detail(&html, url);
                    info!("Successfully processed: {}", vehicle.title);
                    vehicles.push(vehicle);
                }
                Err(e) => {
                    stats.details_failed += 1;
                    error!("Error processing details for {}: {:#}", url, e);
                }
            }
        }

        vehicles
    }

    fn parse_detail(&self, html: &str, url: &str) -> VehicleRecord {
        let document = Html::parse_document(html);
        parse_vehicle(&document, url, &self.fields)
    }

    /// Re-read price, bids, countdown and status for known lots.
    ///
    /// One entry per input URL, in input order; a failed fetch yields an
    /// error placeholder. The store is not touched.
    pub async fn update_listings(&self, urls: &[String]) -> Vec<ListingUpdate> {
        info!("Updating {} listings...", urls.len());
        let pacer = RequestPacer::new(self.params.update_delay);
        let mut updates = Vec::with_capacity(urls.len());
        let mut failed = 0;

        for url in urls {
            pacer.acquire().await;
            match self.fetcher.fetch(url).await {
                Ok(html) => {
                    let vehicle = self.parse_detail(&html, url);
                    updates.push(ListingUpdate::from_record(&vehicle));
                }
                Err(e) => {
                    failed += 1;
                    error!("Failed to update {}: {:#}", url, e);
                    updates.push(ListingUpdate::failed(url.as_str()));
                }
            }
        }

        info!(
            "Successfully updated {} listings ({} failed).",
            updates.len() - failed,
            failed
        );
        updates
    }
}
