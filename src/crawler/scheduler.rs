//! Pagination scheduler
//!
//! This module walks the result pages of one target character:
//! - Sequential walk that stops at the first page without a successor
//! - Concurrent dispatch bounded by a semaphore
//! - Early stop: cancel pending fetches once the last page is known
//! - Backfill of every page below the boundary that has no outcome yet
//!
//! Workers never touch the session. They send their [`PageOutcome`] over a
//! channel and a single loop records it.

use crate::crawler::{PageFetcher, RetryPolicy, Sleeper, TokioSleeper};
use crate::state::{
    FailureReason, PageFailure, PageOutcome, PageReport, PageStatus, SchedulerPhase, ScrapeSession,
};
use crate::{Result, VocabError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Default number of in-flight page fetches
pub const DEFAULT_CONCURRENCY: usize = 10;

/// How result pages are walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One page at a time, no retries
    Sequential,

    /// Bounded parallel dispatch with retry, early stop and backfill
    Concurrent,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sequential" => Ok(Self::Sequential),
            "c" | "concurrent" => Ok(Self::Concurrent),
            other => Err(format!(
                "unknown strategy '{}' (expected sequential or concurrent)",
                other
            )),
        }
    }
}

/// Drives a [`PageFetcher`] across the pages of one target
pub struct PaginationScheduler {
    fetcher: Arc<dyn PageFetcher>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    progress: Option<mpsc::UnboundedSender<PageReport>>,
}

impl PaginationScheduler {
    /// Creates a scheduler with the default retry policy and tokio timer
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            sleeper: Arc::new(TokioSleeper),
            retry: RetryPolicy::default(),
            progress: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sends a [`PageReport`] for every recorded page
    ///
    /// A page later dropped for lying past the last page is followed by a
    /// [`PageStatus::Discarded`] report.
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<PageReport>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Scrapes up to `page_budget` pages for `target`
    ///
    /// # Arguments
    ///
    /// * `target` - The kanji to search for
    /// * `page_budget` - Hard upper bound on the pages fetched
    /// * `strategy` - Sequential or concurrent walk
    /// * `concurrency` - Maximum in-flight fetches (concurrent only)
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeSession)` - Finalized session; later pages may have failed
    /// * `Err(VocabError::InvalidBudget)` - `page_budget` is 0
    /// * `Err(VocabError::FatalScrape)` - Page 1 could not be obtained
    pub async fn run(
        &self,
        target: char,
        page_budget: u32,
        strategy: Strategy,
        concurrency: usize,
    ) -> Result<ScrapeSession> {
        if page_budget == 0 {
            return Err(VocabError::InvalidBudget(page_budget));
        }

        tracing::info!(
            "Scraping '{}' ({} strategy, up to {} pages)",
            target,
            strategy,
            page_budget
        );

        let mut session = ScrapeSession::new(target, strategy, page_budget);

        match strategy {
            Strategy::Sequential => self.run_sequential(&mut session).await?,
            Strategy::Concurrent => self.run_concurrent(&mut session, concurrency.max(1)).await?,
        }

        ensure_first_page(&session)?;
        session.finalize();

        if session.is_partial() {
            tracing::warn!(
                "Partial result for '{}': page(s) {:?} failed",
                target,
                session.failed_pages()
            );
        }

        tracing::info!(
            "Finished '{}': {} entries from {} page(s)",
            target,
            session.merged_entries.len(),
            session.pages.len()
        );

        Ok(session)
    }

    async fn run_sequential(&self, session: &mut ScrapeSession) -> Result<()> {
        let target = session.target;

        for page_index in 1..=session.page_budget {
            match self.fetcher.fetch_page(target, page_index).await {
                Ok(result) => {
                    let is_last = !result.has_next_page;
                    self.record(session, PageOutcome::Success(result));
                    if is_last {
                        self.mark_last_page(session, page_index);
                        break;
                    }
                }
                Err(e) => {
                    self.record(
                        session,
                        PageOutcome::Failure(PageFailure {
                            page_index,
                            reason: FailureReason::SequentialAbort(e.to_string()),
                        }),
                    );
                    break;
                }
            }
        }

        session.transition(SchedulerPhase::Complete)
    }

    async fn run_concurrent(&self, session: &mut ScrapeSession, concurrency: usize) -> Result<()> {
        let target = session.target;
        let page_budget = session.page_budget;

        session.transition(SchedulerPhase::Dispatching)?;

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<PageOutcome>(page_budget as usize);
        let mut tasks = JoinSet::new();

        for page_index in 1..=page_budget {
            let fetcher = Arc::clone(&self.fetcher);
            let sleeper = Arc::clone(&self.sleeper);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let tx = tx.clone();
            let retry = self.retry;

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return,
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };

                if cancel.is_cancelled() {
                    return;
                }

                let outcome = retry
                    .fetch_with_retry(fetcher.as_ref(), sleeper.as_ref(), target, page_index)
                    .await;
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        tracing::debug!(
            "Dispatched {} page tasks with {} permits",
            page_budget,
            concurrency
        );
        session.transition(SchedulerPhase::Draining)?;

        while let Some(outcome) = rx.recv().await {
            let page_index = outcome.page_index();

            if let Some(last) = session.last_valid_page {
                if page_index > last {
                    tracing::debug!("Discarding page {} beyond last page {}", page_index, last);
                    continue;
                }
            }

            let is_last = outcome.is_last_page();
            self.record(session, outcome);

            if is_last && self.mark_last_page(session, page_index) {
                tracing::debug!(
                    "Page {} has no successor, cancelling pending fetches",
                    page_index
                );
                cancel.cancel();
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Page task did not complete: {}", e);
            }
        }

        session.transition(SchedulerPhase::Backfilling)?;

        let mut page_index = 1;
        while page_index <= session.boundary() {
            if !session.contains_page(page_index) {
                tracing::debug!("Backfilling page {}", page_index);

                let outcome = self
                    .retry
                    .fetch_with_retry(self.fetcher.as_ref(), self.sleeper.as_ref(), target, page_index)
                    .await;
                let is_last = outcome.is_last_page();
                self.record(session, outcome);

                if is_last {
                    self.mark_last_page(session, page_index);
                }
            }
            page_index += 1;
        }

        session.transition(SchedulerPhase::Complete)
    }

    /// Records an outcome, logs it and forwards its report
    fn record(&self, session: &mut ScrapeSession, outcome: PageOutcome) {
        let report = session.record(outcome);
        log_report(&report);
        self.send(report);
    }

    /// Lowers the boundary and retracts reports for pages it drops
    ///
    /// Returns true if the boundary moved.
    fn mark_last_page(&self, session: &mut ScrapeSession, page_index: u32) -> bool {
        match session.mark_last_page(page_index) {
            Some(dropped) => {
                for page in dropped {
                    let report = PageReport::discarded(page);
                    log_report(&report);
                    self.send(report);
                }
                true
            }
            None => false,
        }
    }

    fn send(&self, report: PageReport) {
        if let Some(progress) = &self.progress {
            // A closed receiver only means nobody is watching
            let _ = progress.send(report);
        }
    }
}

fn log_report(report: &PageReport) {
    match report.status {
        PageStatus::Succeeded => tracing::info!(
            "Page {}: {} entries ({} scanned)",
            report.page_index,
            report.entries_found,
            report.entries_scanned
        ),
        PageStatus::Empty => tracing::info!(
            "Page {}: no matching entries ({} scanned)",
            report.page_index,
            report.entries_scanned
        ),
        PageStatus::Failed => tracing::warn!(
            "Page {} failed: {}",
            report.page_index,
            report.failure.as_deref().unwrap_or("unknown error")
        ),
        PageStatus::Discarded => tracing::debug!(
            "Page {} dropped, past the last page",
            report.page_index
        ),
    }
}

/// Page 1 carries the character metadata; without it the run is void
fn ensure_first_page(session: &ScrapeSession) -> Result<()> {
    match session.pages.get(&1) {
        Some(PageOutcome::Success(_)) => Ok(()),
        Some(PageOutcome::Failure(failure)) => Err(VocabError::FatalScrape {
            target: session.target,
            reason: format!("page 1 {}", failure.reason),
        }),
        None => Err(VocabError::FatalScrape {
            target: session.target,
            reason: "page 1 was never fetched".to_string(),
        }),
    }
}
