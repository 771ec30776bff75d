use crate::crawler::{merge, Strategy};
use crate::state::{PageOutcome, PageReport, SchedulerPhase};
use crate::vocab::{annotate_reading, CharacterInfo, Entry};
use crate::VocabError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Aggregate of one scrape run for a single target character
///
/// The scheduler fills `pages` incrementally; `merged_entries` stays empty
/// until [`ScrapeSession::finalize`] runs at the end of the run. Nothing here
/// outlives the caller's use of the session.
#[derive(Debug, Clone)]
pub struct ScrapeSession {
    /// The kanji being searched for
    pub target: char,

    /// Strategy the session was run with
    pub strategy: Strategy,

    /// Upper bound on the pages that may be fetched
    pub page_budget: u32,

    /// Recorded outcomes keyed by page index
    pub pages: BTreeMap<u32, PageOutcome>,

    /// Metadata for the target kanji, taken from page 1
    pub character_info: Option<CharacterInfo>,

    /// Lowest page that reported the end of results, if any did
    pub last_valid_page: Option<u32>,

    /// Ordered, deduplicated entries; filled by `finalize`
    pub merged_entries: Vec<Entry>,

    /// Current scheduler phase
    pub phase: SchedulerPhase,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScrapeSession {
    /// Creates an idle session
    pub fn new(target: char, strategy: Strategy, page_budget: u32) -> Self {
        Self {
            target,
            strategy,
            page_budget,
            pages: BTreeMap::new(),
            character_info: None,
            last_valid_page: None,
            merged_entries: Vec::new(),
            phase: SchedulerPhase::Idle,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Moves the session to the next scheduler phase
    pub fn transition(&mut self, to: SchedulerPhase) -> Result<(), VocabError> {
        if !self.phase.can_transition_to(to) {
            return Err(VocabError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::trace!("Session {} phase {} -> {}", self.target, self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Records a page outcome and returns its progress report
    ///
    /// Character metadata from page 1 is lifted into the session here. A
    /// later outcome for the same page replaces the earlier one.
    pub fn record(&mut self, outcome: PageOutcome) -> PageReport {
        if let PageOutcome::Success(result) = &outcome {
            if result.page_index == 1 {
                if let Some(info) = &result.character_info {
                    self.character_info = Some(info.clone());
                }
            }
        }

        let report = outcome.report();
        self.pages.insert(outcome.page_index(), outcome);
        report
    }

    /// Returns true if an outcome is recorded for the page
    pub fn contains_page(&self, page_index: u32) -> bool {
        self.pages.contains_key(&page_index)
    }

    /// Lowers the end-of-results boundary to `page_index` if it is smaller
    ///
    /// Recorded pages beyond the new boundary are dropped and their indices
    /// returned. Returns `None` if the boundary did not move.
    pub fn mark_last_page(&mut self, page_index: u32) -> Option<Vec<u32>> {
        if matches!(self.last_valid_page, Some(current) if current <= page_index) {
            return None;
        }

        self.last_valid_page = Some(page_index);
        let dropped: Vec<u32> = self
            .pages
            .split_off(&(page_index + 1))
            .into_keys()
            .collect();
        if !dropped.is_empty() {
            tracing::debug!(
                "Discarded {} page(s) beyond last page {}",
                dropped.len(),
                page_index
            );
        }
        Some(dropped)
    }

    /// The highest page index the session must account for
    pub fn boundary(&self) -> u32 {
        self.last_valid_page
            .map(|last| last.min(self.page_budget))
            .unwrap_or(self.page_budget)
    }

    /// Page indices up to the boundary with no recorded outcome
    pub fn missing_pages(&self) -> Vec<u32> {
        (1..=self.boundary())
            .filter(|page| !self.pages.contains_key(page))
            .collect()
    }

    /// Merges the recorded pages into `merged_entries`
    pub fn finalize(&mut self) {
        self.merged_entries = merge(&self.pages);
        self.finished_at = Some(Utc::now());
    }

    /// Rewrites merged readings with on'yomi spans in katakana
    ///
    /// Uses this session's own character metadata; a no-op without it.
    pub fn annotate_readings(&mut self) {
        if let Some(info) = &self.character_info {
            for entry in &mut self.merged_entries {
                entry.reading = annotate_reading(&entry.reading, info);
            }
        }
    }

    /// Indices of pages that ended as failures, ascending
    pub fn failed_pages(&self) -> Vec<u32> {
        self.pages
            .values()
            .filter(|outcome| !outcome.is_success())
            .map(PageOutcome::page_index)
            .collect()
    }

    /// Returns true if any page failed
    pub fn is_partial(&self) -> bool {
        self.pages.values().any(|outcome| !outcome.is_success())
    }

    /// Per-page progress reports, ascending by page
    pub fn page_reports(&self) -> Vec<PageReport> {
        self.pages.values().map(PageOutcome::report).collect()
    }

    /// Entries that passed the filter across all pages, before dedup
    pub fn total_matched(&self) -> usize {
        self.pages
            .values()
            .filter_map(PageOutcome::as_result)
            .map(|result| result.entries.len())
            .sum()
    }

    /// Raw records seen across all pages
    pub fn total_scanned(&self) -> usize {
        self.pages
            .values()
            .filter_map(PageOutcome::as_result)
            .map(|result| result.scanned_count)
            .sum()
    }

    /// Entries collapsed by the surface-form dedup
    pub fn duplicates_dropped(&self) -> usize {
        self.total_matched()
            .saturating_sub(self.merged_entries.len())
    }

    /// Wall time of the run, once finished
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}
