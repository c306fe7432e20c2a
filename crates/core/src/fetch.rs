//! Document retrieval from URLs and standard input.
//!
//! The pipeline only knows the [`Fetcher`] trait; [`HttpFetcher`] is the
//! reqwest-backed implementation used by the CLI.

use std::io::Read;
#[cfg(feature = "fetch")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::{PagecutError, Result};

/// Retrieves the raw document behind a URL.
///
/// Implementations must treat a non-success status and an empty body as
/// errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: format!("Mozilla/5.0 (compatible; pagecut/{})", env!("CARGO_PKG_VERSION")) }
    }
}

/// [`Fetcher`] performing a single HTTP GET per document.
///
/// Redirects are followed. There are no retries.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(PagecutError::HttpError)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_send_error(&self, err: reqwest::Error) -> PagecutError {
        if err.is_timeout() { PagecutError::Timeout { timeout: self.config.timeout } } else { PagecutError::HttpError(err) }
    }
}

#[cfg(feature = "fetch")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed_url = Url::parse(url).map_err(|e| PagecutError::InvalidUrl(format!("{}: {}", url, e)))?;

        tracing::debug!(%url, "fetching document");

        let response = self
            .client
            .get(parsed_url)
            .header("User-Agent", &self.config.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PagecutError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        let content = response.text().await.map_err(|e| self.map_send_error(e))?;

        if content.trim().is_empty() {
            return Err(PagecutError::EmptyResponse(url.to_string()));
        }

        tracing::debug!(%url, bytes = content.len(), "document fetched");

        Ok(content)
    }
}

/// Reads a piped document until EOF.
///
/// Whitespace-only input counts as no input.
pub fn read_piped<R: Read>(mut input: R) -> Result<String> {
    let mut buffer = String::new();
    input.read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        return Err(PagecutError::EmptyInput);
    }

    Ok(buffer)
}
