//! Statistics for a finished scrape session
//!
//! This module condenses a [`ScrapeSession`] into counters for the terminal
//! and the markdown summary.

use crate::crawler::Strategy;
use crate::state::{PageStatus, ScrapeSession};

/// Scrape session statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatistics {
    /// The kanji that was searched
    pub target: char,

    pub strategy: Strategy,

    pub page_budget: u32,

    /// Lowest page that reported the end of results
    pub last_valid_page: Option<u32>,

    /// Pages with a recorded outcome
    pub pages_fetched: usize,

    /// Pages with at least one matching entry
    pub pages_succeeded: usize,

    /// Pages fetched fine with no matching entries
    pub pages_empty: usize,

    /// Pages that failed after retries
    pub pages_failed: usize,

    /// Raw records seen on all pages
    pub entries_scanned: usize,

    /// Records that passed the known-character filter
    pub entries_matched: usize,

    /// Entries after deduplication
    pub entries_merged: usize,

    pub duplicates_dropped: usize,

    /// Wall time in milliseconds, once finished
    pub elapsed_ms: Option<i64>,
}

impl SessionStatistics {
    /// Collects statistics from a session
    pub fn from_session(session: &ScrapeSession) -> Self {
        let reports = session.page_reports();
        let count = |status: PageStatus| reports.iter().filter(|r| r.status == status).count();

        Self {
            target: session.target,
            strategy: session.strategy,
            page_budget: session.page_budget,
            last_valid_page: session.last_valid_page,
            pages_fetched: reports.len(),
            pages_succeeded: count(PageStatus::Succeeded),
            pages_empty: count(PageStatus::Empty),
            pages_failed: count(PageStatus::Failed),
            entries_scanned: session.total_scanned(),
            entries_matched: session.total_matched(),
            entries_merged: session.merged_entries.len(),
            duplicates_dropped: session.duplicates_dropped(),
            elapsed_ms: session.elapsed().map(|d| d.num_milliseconds()),
        }
    }

    /// Share of scanned records that passed the filter, in percent
    pub fn match_rate(&self) -> f64 {
        if self.entries_scanned == 0 {
            0.0
        } else {
            (self.entries_matched as f64 / self.entries_scanned as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SessionStatistics) {
    println!("=== Scrape Statistics: {} ===\n", stats.target);

    println!("Pages:");
    println!(
        "  Fetched: {} (budget {}, {} strategy)",
        stats.pages_fetched, stats.page_budget, stats.strategy
    );
    match stats.last_valid_page {
        Some(last) => println!("  Last page: {}", last),
        None => println!("  Last page: not reached"),
    }
    println!("  With entries: {}", stats.pages_succeeded);
    println!("  Without matches: {}", stats.pages_empty);
    if stats.pages_failed > 0 {
        println!("  Failed: {} (partial result)", stats.pages_failed);
    }
    println!();

    println!("Entries:");
    println!("  Scanned: {}", stats.entries_scanned);
    println!(
        "  Matched: {} ({:.1}%)",
        stats.entries_matched,
        stats.match_rate()
    );
    println!("  Duplicates dropped: {}", stats.duplicates_dropped);
    println!("  Final: {}", stats.entries_merged);

    if let Some(ms) = stats.elapsed_ms {
        println!("\nElapsed: {:.2}s", ms as f64 / 1000.0);
    }
}
