//! Crawler module for result page fetching and aggregation
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching and result page parsing
//! - Retry with exponential backoff
//! - Sequential and concurrent pagination with early stop and backfill
//! - Merging pages into one ordered, deduplicated list
//! - Overall scrape coordination

mod aggregator;
mod coordinator;
mod fetcher;
mod parser;
mod retry;
mod scheduler;

pub use aggregator::merge;
pub use coordinator::{parse_target, run_scrape, validate_target, Coordinator};
pub use fetcher::{build_http_client, HttpPageFetcher, PageFetcher};
pub use parser::{parse_page, ParseOptions};
pub use retry::{
    RetryDecision, RetryPolicy, RetryState, Sleeper, TokioSleeper, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_ATTEMPTS,
};
pub use scheduler::{PaginationScheduler, Strategy, DEFAULT_CONCURRENCY};

use crate::config::Config;
use crate::state::ScrapeSession;
use crate::VocabError;

/// Runs a complete scrape operation
///
/// This is the main entry point for scraping one kanji. It will:
/// 1. Build the HTTP client and page parser from the configuration
/// 2. Walk the result pages with the configured strategy
/// 3. Merge the pages in page order, dropping duplicate words
/// 4. Annotate readings if configured
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `target` - The kanji to search for
///
/// # Returns
///
/// * `Ok(ScrapeSession)` - Scrape completed
/// * `Err(VocabError)` - Scrape failed
pub async fn scrape(config: Config, target: char) -> Result<ScrapeSession, VocabError> {
    run_scrape(config, target).await
}
