//! Scrape coordinator - wires configuration into the engine
//!
//! This module contains the entry point the CLI uses:
//! - Validating the target character
//! - Building the HTTP fetcher and the pagination scheduler from config
//! - Running the scrape and post-processing the session

use crate::config::Config;
use crate::crawler::{HttpPageFetcher, PageFetcher, PaginationScheduler, Sleeper};
use crate::state::{PageReport, ScrapeSession};
use crate::vocab::is_kanji;
use crate::{Result, VocabError};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Main scrape coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    scheduler: PaginationScheduler,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(VocabError)` - Known characters or HTTP client were invalid
    pub fn new(config: Config) -> Result<Self> {
        let options = config.vocabulary.parse_options()?;
        let fetcher = HttpPageFetcher::new(config.scraper.clone(), options)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a coordinator around any page source
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        let scheduler =
            PaginationScheduler::new(fetcher).with_retry_policy(config.pagination.retry_policy());

        Self {
            config: Arc::new(config),
            scheduler,
        }
    }

    /// Streams a [`PageReport`] for every page as it is recorded
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<PageReport>) -> Self {
        self.scheduler = self.scheduler.with_progress(progress);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.scheduler = self.scheduler.with_sleeper(sleeper);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scrapes all vocabulary for `target`
    ///
    /// Readings are annotated with on'yomi after merging when the
    /// configuration asks for it.
    pub async fn run(&self, target: char) -> Result<ScrapeSession> {
        validate_target(target)?;

        let pagination = &self.config.pagination;
        let mut session = self
            .scheduler
            .run(
                target,
                pagination.page_budget,
                pagination.strategy,
                pagination.concurrency,
            )
            .await?;

        if self.config.vocabulary.annotate_readings {
            session.annotate_readings();
        }

        Ok(session)
    }
}

/// Checks that `target` is a single kanji
pub fn validate_target(target: char) -> Result<()> {
    if is_kanji(target) {
        Ok(())
    } else {
        Err(VocabError::InvalidTarget(target.to_string()))
    }
}

/// Parses command-line input into a target kanji
///
/// Surrounding whitespace is ignored; anything but exactly one kanji is
/// rejected.
pub fn parse_target(input: &str) -> Result<char> {
    let mut chars = input.trim().chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            validate_target(c)?;
            Ok(c)
        }
        _ => Err(VocabError::InvalidTarget(input.to_string())),
    }
}

/// Runs a complete scrape for one target
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `target` - The kanji to search for
///
/// # Returns
///
/// * `Ok(ScrapeSession)` - Scrape completed, possibly with failed pages
/// * `Err(VocabError)` - Scrape could not run or page 1 failed
///
/// # Example
///
/// ```no_run
/// use kanji_vocab::config::load_config;
/// use kanji_vocab::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let session = run_scrape(config, '人').await?;
/// println!("{} words", session.merged_entries.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config, target: char) -> Result<ScrapeSession> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(target).await
}
