//! Scheduler phase definitions
//!
//! The concurrent strategy walks every phase in order; the sequential strategy
//! goes straight from `Idle` to `Complete`.

use std::fmt;

/// Lifecycle phase of a pagination run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerPhase {
    /// Nothing started yet
    Idle,

    /// Page tasks are being spawned
    Dispatching,

    /// Completed pages are being collected in completion order
    Draining,

    /// Pages left unresolved by the early stop are being fetched in order
    Backfilling,

    /// Terminal; the session has been finalized
    Complete,
}

impl SchedulerPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: SchedulerPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Dispatching)
                | (Self::Idle, Self::Complete)
                | (Self::Dispatching, Self::Draining)
                | (Self::Draining, Self::Backfilling)
                | (Self::Backfilling, Self::Complete)
        )
    }

    /// Returns true for the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dispatching => "dispatching",
            Self::Draining => "draining",
            Self::Backfilling => "backfilling",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
