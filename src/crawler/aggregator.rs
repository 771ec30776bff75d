//! Result aggregation
//!
//! Folds the recorded page outcomes into a single entry list. The scheduler
//! calls this once every worker has settled, so no locking is involved.

use crate::state::PageOutcome;
use crate::vocab::Entry;
use std::collections::{BTreeMap, HashSet};

/// Merges page outcomes into one ordered, deduplicated entry list
///
/// Pages are visited in ascending index order regardless of when they were
/// recorded, entries keep their on-page order, and failed pages contribute
/// nothing. Entries are deduplicated by `surface_form`; the first occurrence
/// wins and later ones are dropped silently.
///
/// The function is pure, so calling it twice on the same map yields the same
/// list.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use kanji_vocab::crawler::merge;
/// use kanji_vocab::state::{PageOutcome, PageResult};
/// use kanji_vocab::vocab::Entry;
///
/// let mut pages = BTreeMap::new();
/// pages.insert(2, PageOutcome::Success(PageResult::new(2, vec![Entry::new("大人", "おとな")], false)));
/// pages.insert(1, PageOutcome::Success(PageResult::new(1, vec![Entry::new("人", "ひと")], true)));
///
/// let merged = merge(&pages);
/// assert_eq!(merged[0].surface_form, "人");
/// assert_eq!(merged[1].surface_form, "大人");
/// ```
pub fn merge(pages: &BTreeMap<u32, PageOutcome>) -> Vec<Entry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();

    for result in pages.values().filter_map(PageOutcome::as_result) {
        for entry in &result.entries {
            if seen.insert(entry.surface_form.as_str()) {
                merged.push(entry.clone());
            } else {
                tracing::trace!(
                    "Dropping duplicate '{}' from page {}",
                    entry.surface_form,
                    result.page_index
                );
            }
        }
    }

    merged
}
