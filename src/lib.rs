//! Kanji-Vocab: a kanji-driven vocabulary harvester
//!
//! This crate scrapes a dictionary site for vocabulary containing a target kanji,
//! walks the paginated results sequentially or concurrently, and merges the pages
//! into one ordered, deduplicated list ready for flashcard export.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod vocab;

use thiserror::Error;

/// Main error type for Kanji-Vocab operations
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scrape of '{target}' failed: {reason}")]
    FatalScrape { target: char, reason: String },

    #[error("Invalid target character: {0:?}")]
    InvalidTarget(String),

    #[error("Page budget must be at least 1, got {0}")]
    InvalidBudget(u32),

    #[error("Invalid scheduler transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SchedulerPhase,
        to: state::SchedulerPhase,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid known characters: {0}")]
    InvalidCharacters(String),
}

/// Errors raised by a single page fetch
///
/// Only [`FetchError::Transient`] is worth retrying; a page whose layout cannot
/// be interpreted will not get better on a second attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transient failure on page {page}: {message}")]
    Transient { page: u32, message: String },

    #[error("Unparseable page {page}: {message}")]
    PermanentParse { page: u32, message: String },
}

impl FetchError {
    /// Returns true if the failure may succeed on another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The page index the error belongs to
    pub fn page(&self) -> u32 {
        match self {
            Self::Transient { page, .. } | Self::PermanentParse { page, .. } => *page,
        }
    }
}

/// Result type alias for Kanji-Vocab operations
pub type Result<T> = std::result::Result<T, VocabError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{PaginationScheduler, PageFetcher, RetryPolicy, Strategy};
pub use state::{PageFailure, PageOutcome, PageResult, ScrapeSession, SchedulerPhase};
pub use vocab::{CharacterInfo, Entry, KnownCharacters};
