use crate::crawler::{
    ParseOptions, RetryPolicy, Strategy, DEFAULT_BASE_DELAY, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::vocab::KnownCharacters;
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Placeholder in `base-url` replaced by the target kanji
pub const KANJI_PLACEHOLDER: &str = "{kanji}";

/// Main configuration structure for Kanji-Vocab
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Dictionary site and HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Search URL template containing `{kanji}`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// How result pages are walked
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Maximum number of pages to fetch
    #[serde(rename = "page-budget", default = "default_page_budget")]
    pub page_budget: u32,

    /// Sequential or concurrent walk
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    /// Maximum in-flight page fetches (concurrent strategy only)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per page, including the first (concurrent strategy only)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Word filtering and normalization
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyConfig {
    /// Characters the learner already knows
    #[serde(rename = "known-characters", default)]
    pub known_characters: String,

    /// Treat all hiragana and katakana as known
    #[serde(rename = "allow-kana", default = "default_true")]
    pub allow_kana: bool,

    #[serde(rename = "shorten-tags", default = "default_true")]
    pub shorten_tags: bool,

    #[serde(rename = "shorten-glosses", default = "default_true")]
    pub shorten_glosses: bool,

    /// Write on'yomi spans of readings in katakana
    #[serde(rename = "annotate-readings", default = "default_true")]
    pub annotate_readings: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: Option<PathBuf>,

    /// Path to the tab-separated flashcard export
    #[serde(rename = "export-path")]
    pub export_path: Option<PathBuf>,
}

impl ScraperConfig {
    /// Search URL for `target`, without a page parameter
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The template with `{kanji}` substituted
    /// * `Err(ConfigError::InvalidUrl)` - The result is not an http(s) URL
    pub fn search_url(&self, target: char) -> Result<Url, ConfigError> {
        let raw = self
            .base_url
            .replace(KANJI_PLACEHOLDER, &target.to_string());

        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl(format!(
                "'{}' must use http or https, got '{}'",
                raw, other
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl PaginationConfig {
    /// Retry policy described by this section
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

impl VocabularyConfig {
    /// Builds the parser options, parsing the known-character list
    pub fn parse_options(&self) -> Result<ParseOptions, ConfigError> {
        Ok(ParseOptions {
            known: KnownCharacters::parse(&self.known_characters, self.allow_kana)?,
            shorten_tags: self.shorten_tags,
            shorten_glosses: self.shorten_glosses,
        })
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            strategy: default_strategy(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            known_characters: String::new(),
            allow_kana: true,
            shorten_tags: true,
            shorten_glosses: true,
            annotate_readings: true,
        }
    }
}

fn default_user_agent() -> String {
    format!("kanji-vocab/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_page_budget() -> u32 {
    20
}

fn default_strategy() -> Strategy {
    Strategy::Concurrent
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

fn default_true() -> bool {
    true
}
