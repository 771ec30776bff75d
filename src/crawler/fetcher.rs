//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Building the search URL for a target kanji and page
//! - Classifying failures as transient or permanent
//!
//! Retries are not done here; see [`crate::crawler::RetryPolicy`].

use crate::config::ScraperConfig;
use crate::crawler::parser::{parse_page, ParseOptions};
use crate::state::PageResult;
use crate::{ConfigError, FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Source of result pages for a target character
///
/// Implementations make one attempt per call. `page_index` is 1-based.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, target: char, page_index: u32) -> FetchResult<PageResult>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use kanji_vocab::config::ScraperConfig;
/// use kanji_vocab::crawler::build_http_client;
///
/// let config = ScraperConfig {
///     base_url: "https://jisho.org/search/{kanji}%20%23words".to_string(),
///     user_agent: "kanji-vocab/0.1".to_string(),
///     request_timeout_secs: 10,
///     connect_timeout_secs: 5,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches result pages from the dictionary site over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    config: ScraperConfig,
    options: ParseOptions,
}

impl HttpPageFetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(config: ScraperConfig, options: ParseOptions) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self::with_client(client, config, options))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: ScraperConfig, options: ParseOptions) -> Self {
        Self {
            client,
            config,
            options,
        }
    }

    /// URL of the given result page for `target`
    ///
    /// # Example
    ///
    /// ```
    /// use kanji_vocab::config::ScraperConfig;
    /// use kanji_vocab::crawler::{HttpPageFetcher, ParseOptions};
    ///
    /// let config = ScraperConfig {
    ///     base_url: "https://jisho.org/search/{kanji}".to_string(),
    ///     user_agent: "kanji-vocab/0.1".to_string(),
    ///     request_timeout_secs: 10,
    ///     connect_timeout_secs: 5,
    /// };
    /// let fetcher = HttpPageFetcher::new(config, ParseOptions::default()).unwrap();
    ///
    /// let url = fetcher.page_url('人', 2).unwrap();
    /// assert_eq!(url.as_str(), "https://jisho.org/search/%E4%BA%BA?page=2");
    /// ```
    pub fn page_url(&self, target: char, page_index: u32) -> Result<Url, ConfigError> {
        let mut url = self.config.search_url(target)?;
        url.query_pairs_mut()
            .append_pair("page", &page_index.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, target: char, page_index: u32) -> FetchResult<PageResult> {
        if page_index == 0 {
            return Err(FetchError::PermanentParse {
                page: page_index,
                message: "page indices start at 1".to_string(),
            });
        }

        let url = self
            .page_url(target, page_index)
            .map_err(|e| FetchError::PermanentParse {
                page: page_index,
                message: e.to_string(),
            })?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transient(page_index, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transient {
                page: page_index,
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transient(page_index, &e))?;

        parse_page(&body, target, page_index, &self.options)
    }
}

/// Describes a request error as a retryable failure
fn transient(page: u32, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transient { page, message }
}
