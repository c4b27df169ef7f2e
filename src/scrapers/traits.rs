use anyhow::Result;
use async_trait::async_trait;

/// Common trait for everything that can turn a URL into page HTML
/// Plain HTTP and headless Chrome both sit behind it, and tests swap in fakes
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page and return its HTML
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Get the name of the fetcher
    fn name(&self) -> &'static str;
}
