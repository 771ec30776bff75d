//! Per-page outcome types produced by the scheduler
//!
//! A page either resolves to a [`PageResult`] or, once retries are spent, to a
//! [`PageFailure`] value. Failures are recorded, never thrown.

use crate::vocab::{CharacterInfo, Entry};
use std::fmt;

/// Successfully fetched and parsed result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// 1-based page index
    pub page_index: u32,

    /// Entries that passed the known-character filter, in page order
    pub entries: Vec<Entry>,

    /// Whether the site advertises a further page
    pub has_next_page: bool,

    /// Raw records seen on the page before filtering
    pub scanned_count: usize,

    /// Target kanji metadata; only present on page 1
    pub character_info: Option<CharacterInfo>,
}

impl PageResult {
    /// Creates a page result without character metadata
    pub fn new(page_index: u32, entries: Vec<Entry>, has_next_page: bool) -> Self {
        let scanned_count = entries.len();
        Self {
            page_index,
            entries,
            has_next_page,
            scanned_count,
            character_info: None,
        }
    }

    /// Overrides the raw record count
    pub fn with_scanned_count(mut self, scanned_count: usize) -> Self {
        self.scanned_count = scanned_count;
        self
    }

    /// Attaches character metadata
    pub fn with_character_info(mut self, info: CharacterInfo) -> Self {
        self.character_info = Some(info);
        self
    }
}

/// Why a page ended without a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every attempt failed with a transient error
    ExhaustedRetries { attempts: u32, last_error: String },

    /// The page layout could not be interpreted
    PermanentParse(String),

    /// The sequential strategy hit an error and stopped at this page
    SequentialAbort(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExhaustedRetries {
                attempts,
                last_error,
            } => write!(
                f,
                "exhausted retries after {} attempts ({})",
                attempts, last_error
            ),
            Self::PermanentParse(message) => write!(f, "unparseable page ({})", message),
            Self::SequentialAbort(message) => write!(f, "fetch failed ({})", message),
        }
    }
}

/// Terminal per-page failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page_index: u32,
    pub reason: FailureReason,
}

/// Final state of one page in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Success(PageResult),
    Failure(PageFailure),
}

impl PageOutcome {
    /// The page index this outcome belongs to
    pub fn page_index(&self) -> u32 {
        match self {
            Self::Success(result) => result.page_index,
            Self::Failure(failure) => failure.page_index,
        }
    }

    /// Returns true if the page produced a result
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the page reported the end of results
    ///
    /// Failures never count as an end signal.
    pub fn is_last_page(&self) -> bool {
        matches!(self, Self::Success(result) if !result.has_next_page)
    }

    /// Borrows the result, if any
    pub fn as_result(&self) -> Option<&PageResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    /// Builds the progress report for this outcome
    pub fn report(&self) -> PageReport {
        match self {
            Self::Success(result) => PageReport {
                page_index: result.page_index,
                status: if result.entries.is_empty() {
                    PageStatus::Empty
                } else {
                    PageStatus::Succeeded
                },
                entries_found: result.entries.len(),
                entries_scanned: result.scanned_count,
                has_next_page: Some(result.has_next_page),
                failure: None,
            },
            Self::Failure(failure) => PageReport {
                page_index: failure.page_index,
                status: PageStatus::Failed,
                entries_found: 0,
                entries_scanned: 0,
                has_next_page: None,
                failure: Some(failure.reason.to_string()),
            },
        }
    }
}

/// Severity class of a recorded page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Fetched with at least one matching entry
    Succeeded,

    /// Fetched fine but nothing passed the filter (informational)
    Empty,

    /// No result after retries (warning)
    Failed,

    /// Reported earlier, then dropped for lying beyond the last page
    Discarded,
}

impl PageStatus {
    /// Returns true if the status deserves a warning rather than a note
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "ok",
            Self::Empty => "empty",
            Self::Failed => "failed",
            Self::Discarded => "discarded",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress bookkeeping for one page, suitable for a live view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_index: u32,
    pub status: PageStatus,
    pub entries_found: usize,
    pub entries_scanned: usize,
    /// `None` when the page failed and the signal is unknown
    pub has_next_page: Option<bool>,
    pub failure: Option<String>,
}

impl PageReport {
    /// Retraction for a page that no longer belongs to the result
    pub fn discarded(page_index: u32) -> Self {
        Self {
            page_index,
            status: PageStatus::Discarded,
            entries_found: 0,
            entries_scanned: 0,
            has_next_page: None,
            failure: None,
        }
    }
}
