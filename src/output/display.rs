//! Terminal rendering of scrape results

use crate::state::{PageReport, PageStatus};
use crate::vocab::{CharacterInfo, Entry};

/// Renders the target kanji's readings and meaning as a short header
pub fn format_character_info(target: char, info: &CharacterInfo) -> String {
    let mut out = format!("{}  {}\n", target, info.meaning);

    if !info.onyomi.is_empty() {
        out.push_str(&format!("  On:  {}\n", info.onyomi.join("、")));
    }
    if !info.kunyomi.is_empty() {
        out.push_str(&format!("  Kun: {}\n", info.kunyomi.join("、")));
    }
    if !info.info.is_empty() {
        out.push_str(&format!("  {}\n", info.info));
    }

    out
}

/// Renders entries as a numbered list
///
/// The numbers are the 1-based positions accepted by
/// [`crate::output::parse_selection`].
pub fn format_entry_list(entries: &[Entry]) -> String {
    let width = entries.len().to_string().len();
    let mut out = String::new();

    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>width$}. {} 【{}】",
            i + 1,
            entry.surface_form,
            entry.reading,
            width = width
        ));
        if !entry.tags.is_empty() {
            out.push_str(&format!(" [{}]", entry.tags.join(", ")));
        }
        out.push('\n');

        for line in entry.numbered_glosses().lines() {
            out.push_str(&format!("{:width$}    {}\n", "", line, width = width));
        }
    }

    out
}

/// One-line rendering of a page report for live progress
pub fn format_page_report(report: &PageReport) -> String {
    match report.status {
        PageStatus::Succeeded => format!(
            "page {:>3}: {} entries ({} scanned)",
            report.page_index, report.entries_found, report.entries_scanned
        ),
        PageStatus::Empty => format!(
            "page {:>3}: no matching entries ({} scanned)",
            report.page_index, report.entries_scanned
        ),
        PageStatus::Failed => format!(
            "page {:>3}: FAILED {}",
            report.page_index,
            report.failure.as_deref().unwrap_or("")
        ),
        PageStatus::Discarded => format!(
            "page {:>3}: discarded, past the last page",
            report.page_index
        ),
    }
}
