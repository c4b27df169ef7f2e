use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Navigation retry policy for the headless browser
#[derive(Debug, Clone, Copy)]
pub struct BrowserRetry {
    pub attempts: u32,
    pub backoff: Duration,
    /// Time given to client-side rendering after navigation completes
    pub render_wait: Duration,
}

impl Default for BrowserRetry {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(5),
            render_wait: Duration::from_secs(3),
        }
    }
}

/// Fetcher that renders pages in headless Chrome
pub struct BrowserFetcher {
    browser: Browser,
    retry: BrowserRetry,
}

impl BrowserFetcher {
    /// Launch headless Chrome with the default retry policy
    pub fn new() -> Result<Self> {
        Self::with_retry(BrowserRetry::default())
    }

    pub fn with_retry(retry: BrowserRetry) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self { browser, retry })
    }

    fn render(browser: &Browser, url: &str, render_wait: Duration) -> Result<String> {
        let tab = browser.new_tab()?;

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        thread::sleep(render_wait);

        let html = tab.get_content()?;
        if let Err(e) = tab.close(true) {
            debug!("Failed to close tab for {}: {}", url, e);
        }

        if html.is_empty() {
            anyhow::bail!("Rendered page for {} is empty", url);
        }
        Ok(html)
    }

    fn render_with_retry(browser: &Browser, url: &str, retry: BrowserRetry) -> Result<String> {
        let html = with_retries(retry.attempts, retry.backoff, url, |_| {
            Self::render(browser, url, retry.render_wait)
        })?;
        debug!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }
}

/// Run `op` up to `attempts` times (at least once), sleeping `backoff`
/// between failures. `op` receives the 1-based attempt number.
pub fn with_retries<T>(
    attempts: u32,
    backoff: Duration,
    what: &str,
    mut op: impl FnMut(u32) -> Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!("Attempt {}/{} for {} failed: {}", attempt, attempts, what, e);
                thread::sleep(backoff);
                attempt += 1;
            }
            Err(e) => {
                return Err(e.context(format!("Skipping {} after {} attempts", what, attempts)));
            }
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let browser = self.browser.clone();
        let retry = self.retry;
        let url = url.to_string();

        // CDP calls block, keep them off the async workers
        tokio::task::spawn_blocking(move || Self::render_with_retry(&browser, &url, retry))
            .await
            .context("Browser task panicked")?
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
