//! State module for tracking scrape progress
//!
//! This module provides the per-page outcome types and the session aggregate
//! that the pagination scheduler fills in.
//!
//! # Components
//!
//! - `PageOutcome`: Result or terminal failure of one page
//! - `SchedulerPhase`: Lifecycle phase of a pagination run
//! - `ScrapeSession`: Everything recorded for one target character

mod page_state;
mod phase;
mod session;

// Re-export main types
pub use page_state::{
    FailureReason, PageFailure, PageOutcome, PageReport, PageResult, PageStatus,
};
pub use phase::SchedulerPhase;
pub use session::ScrapeSession;
