//! Command line and environment configuration.

use clap::Parser;
use std::time::Duration;

use crate::scrapers::types::{DEFAULT_ORIGIN, DEFAULT_SEARCH_PATH};
use crate::scrapers::{PageLimit, SearchParams};

/// Which fetcher turns URLs into HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    Http,
    Browser,
}

/// Auction Scout: crawls vehicle auction listings and serves them over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "auction-scout", version, long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Auction site origin
    #[arg(long, env = "SCOUT_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Path of the vehicle search results
    #[arg(long, env = "SCOUT_SEARCH_PATH", default_value = DEFAULT_SEARCH_PATH)]
    pub search_path: String,

    /// Number of search pages to crawl
    #[arg(long, env = "SCOUT_MAX_PAGES", default_value_t = 5)]
    pub max_pages: usize,

    /// Keep paging until a page has no lots (bounded by --page-cap)
    #[arg(long, env = "SCOUT_UNTIL_EMPTY")]
    pub until_empty: bool,

    /// Hard page limit when paging until empty
    #[arg(long, env = "SCOUT_PAGE_CAP", default_value_t = 50)]
    pub page_cap: usize,

    /// Maximum lot pages fetched per crawl
    #[arg(long, env = "SCOUT_DETAIL_LIMIT", default_value_t = 20)]
    pub detail_limit: usize,

    /// Minimum milliseconds between search page requests
    #[arg(long, env = "SCOUT_PAGE_DELAY_MS", default_value_t = 2000)]
    pub page_delay_ms: u64,

    /// Minimum milliseconds between lot page requests
    #[arg(long, env = "SCOUT_DETAIL_DELAY_MS", default_value_t = 1000)]
    pub detail_delay_ms: u64,

    /// Minimum milliseconds between listing refresh requests
    #[arg(long, env = "SCOUT_UPDATE_DELAY_MS", default_value_t = 500)]
    pub update_delay_ms: u64,

    /// Fail the crawl when the first search page is unreachable or empty
    #[arg(long, env = "SCOUT_STRICT")]
    pub strict: bool,

    /// Render pages with headless Chrome instead of plain HTTP
    #[arg(long, env = "SCOUT_BROWSER")]
    pub browser: bool,

    /// Per-request timeout for the HTTP fetcher
    #[arg(long, env = "SCOUT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            origin: self.origin.clone(),
            search_path: self.search_path.clone(),
            pages: if self.until_empty {
                PageLimit::UntilEmpty { cap: self.page_cap }
            } else {
                PageLimit::Fixed(self.max_pages)
            },
            detail_limit: self.detail_limit,
            page_delay: Duration::from_millis(self.page_delay_ms),
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            update_delay: Duration::from_millis(self.update_delay_ms),
            strict: self.strict,
        }
    }

    pub fn fetcher_kind(&self) -> FetcherKind {
        if self.browser {
            FetcherKind::Browser
        } else {
            FetcherKind::Http
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_search_params() {
        let cli = Cli::try_parse_from(["auction-scout"]).unwrap();
        let params = cli.search_params();
        let defaults = SearchParams::default();

        assert_eq!(params.origin, defaults.origin);
        assert_eq!(params.pages, defaults.pages);
        assert_eq!(params.detail_limit, defaults.detail_limit);
        assert_eq!(params.page_delay, defaults.page_delay);
        assert_eq!(params.detail_delay, defaults.detail_delay);
        assert_eq!(params.update_delay, defaults.update_delay);
        assert_eq!(cli.fetcher_kind(), FetcherKind::Http);
    }

    #[test]
    fn until_empty_uses_page_cap() {
        let cli = Cli::try_parse_from([
            "auction-scout",
            "--until-empty",
            "--page-cap",
            "12",
            "--detail-limit",
            "50",
            "--browser",
        ])
        .unwrap();
        let params = cli.search_params();

        assert_eq!(params.pages, PageLimit::UntilEmpty { cap: 12 });
        assert_eq!(params.detail_limit, 50);
        assert_eq!(cli.fetcher_kind(), FetcherKind::Browser);
    }
}
