//! Retry with exponential backoff
//!
//! The attempt counter and delay schedule live in [`RetryState`], a small
//! state machine that knows nothing about tasks or clocks. Waiting is done
//! through a [`Sleeper`] so tests can observe the schedule without sleeping.

use crate::crawler::PageFetcher;
use crate::state::{FailureReason, PageFailure, PageOutcome};
use crate::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Default number of attempts per page
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry policy with exponential backoff
///
/// Between attempts the policy waits `base_delay * 2^n`, where `n` is 0 for
/// the first retry. With the defaults a page is tried three times with waits
/// of 1s and 2s in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the duration, then try again
    RetryAfter(Duration),

    /// Stop and record the page as failed
    GiveUp(FailureReason),
}

/// Attempt bookkeeping for a single page
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    /// Number of failed attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Records a failed attempt and decides whether to go again
    pub fn record_failure(&mut self, error: &FetchError) -> RetryDecision {
        self.attempts += 1;

        match error {
            FetchError::PermanentParse { message, .. } => {
                RetryDecision::GiveUp(FailureReason::PermanentParse(message.clone()))
            }
            FetchError::Transient { message, .. } => {
                if self.attempts >= self.policy.max_attempts {
                    RetryDecision::GiveUp(FailureReason::ExhaustedRetries {
                        attempts: self.attempts,
                        last_error: message.clone(),
                    })
                } else {
                    RetryDecision::RetryAfter(self.policy.delay_for(self.attempts - 1))
                }
            }
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; at least one attempt is always made
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before the retry with the given 0-based index
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry_index))
    }

    /// Starts bookkeeping for a new page
    pub fn start(&self) -> RetryState {
        RetryState {
            policy: *self,
            attempts: 0,
        }
    }

    /// Fetches one page, retrying transient failures
    ///
    /// Never returns an error: a page that cannot be produced comes back as a
    /// [`PageOutcome::Failure`] so the caller can carry on with other pages.
    pub async fn fetch_with_retry(
        &self,
        fetcher: &dyn PageFetcher,
        sleeper: &dyn Sleeper,
        target: char,
        page_index: u32,
    ) -> PageOutcome {
        let mut state = self.start();

        loop {
            match fetcher.fetch_page(target, page_index).await {
                Ok(result) => {
                    if state.attempts() > 0 {
                        tracing::info!(
                            "Page {} succeeded on attempt {}",
                            page_index,
                            state.attempts() + 1
                        );
                    }
                    return PageOutcome::Success(result);
                }
                Err(e) => match state.record_failure(&e) {
                    RetryDecision::RetryAfter(delay) => {
                        tracing::warn!(
                            "Page {} failed (attempt {}), retrying in {:?}: {}",
                            page_index,
                            state.attempts(),
                            delay,
                            e
                        );
                        sleeper.sleep(delay).await;
                    }
                    RetryDecision::GiveUp(reason) => {
                        tracing::warn!("Giving up on page {}: {}", page_index, reason);
                        return PageOutcome::Failure(PageFailure { page_index, reason });
                    }
                },
            }
        }
    }
}
