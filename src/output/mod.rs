//! Output module for presenting and exporting scrape results
//!
//! This module handles:
//! - Printing the merged vocabulary and run statistics to the terminal
//! - Generating markdown summaries of a scrape session
//! - Selecting entries and exporting them as TSV for flashcard import

pub mod display;
pub mod export;
mod markdown;
pub mod stats;

pub use display::{format_character_info, format_entry_list, format_page_report};
pub use export::{export_tsv, format_tsv, parse_selection, select_entries};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, SessionStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
