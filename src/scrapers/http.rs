use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP fetcher that looks like a desktop browser
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a 30 second request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        // Accept-Encoding is negotiated by reqwest itself so bodies get decoded
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_browser_headers_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lot/1"))
            // wiremock splits header values on commas, and the UA has one
            .and(headers("user-agent", USER_AGENT.split(", ").collect()))
            .and(header("dnt", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>2019 Toyota Corolla</h1>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let html = fetcher
            .fetch(&format!("{}/lot/1", server.uri()))
            .await
            .unwrap();
        assert!(html.contains("Toyota"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/blocked", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
