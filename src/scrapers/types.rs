use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ORIGIN: &str = "https://www.grays.com";
pub const DEFAULT_SEARCH_PATH: &str =
    "/search/automotive-trucks-and-marine/motor-vehiclesmotor-cycles/motor-vehicles";

/// How far to page through the search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PageLimit {
    /// Pages 1..=n
    Fixed(usize),
    /// Stop at the first page with no lots, or at `cap`
    UntilEmpty { cap: usize },
}

impl PageLimit {
    pub fn max_pages(&self) -> usize {
        match *self {
            PageLimit::Fixed(n) => n,
            PageLimit::UntilEmpty { cap } => cap,
        }
    }
}

/// Search and crawl parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Site origin used to build index URLs and absolutize lot links
    pub origin: String,
    /// Path of the motor vehicle search results
    pub search_path: String,
    pub pages: PageLimit,
    /// Maximum number of detail pages fetched per crawl
    pub detail_limit: usize,
    /// Minimum gap between index page requests
    pub page_delay: Duration,
    /// Minimum gap between detail page requests
    pub detail_delay: Duration,
    /// Minimum gap between listing refresh requests
    pub update_delay: Duration,
    /// Abort the crawl when page 1 fails or has no lots
    pub strict: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            pages: PageLimit::Fixed(5),
            detail_limit: 20,
            page_delay: Duration::from_secs(2),
            detail_delay: Duration::from_secs(1),
            update_delay: Duration::from_millis(500),
            strict: false,
        }
    }
}

impl SearchParams {
    /// Same parameters with no pauses, for tests and local mirrors
    pub fn without_delays(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self.detail_delay = Duration::ZERO;
        self.update_delay = Duration::ZERO;
        self
    }

    /// URL of one page of search results
    pub fn index_url(&self, page: usize) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(&self.origin)?.join(&self.search_path)?;
        url.query_pairs_mut()
            .append_pair("tab", "items")
            .append_pair("isdesktop", "1")
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }
}
