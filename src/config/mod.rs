//! Configuration module for Kanji-Vocab
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use kanji_vocab::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Scraping up to {} pages", config.pagination.page_budget);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, PaginationConfig, ScraperConfig, VocabularyConfig, KANJI_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

// Re-export validation so overridden configs can be re-checked
pub use validation::validate;
