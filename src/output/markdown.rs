//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a scrape
//! session: run information, statistics, a per-page table and the entries.

use crate::output::stats::SessionStatistics;
use crate::output::OutputResult;
use crate::state::ScrapeSession;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the session to `output_path`
///
/// # Arguments
///
/// * `session` - The finished scrape session
/// * `config_hash` - Hash of the configuration the run used
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    session: &ScrapeSession,
    config_hash: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(session, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote summary to {}", output_path.display());
    Ok(())
}

/// Formats a scrape session as markdown
pub fn format_markdown_summary(session: &ScrapeSession, config_hash: &str) -> String {
    let stats = SessionStatistics::from_session(session);
    let mut md = String::new();

    md.push_str(&format!("# Vocabulary for {}\n\n", session.target));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(finished) = session.finished_at {
        md.push_str(&format!(
            "- **Finished**: {}\n",
            finished.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(ms) = stats.elapsed_ms {
        md.push_str(&format!("- **Duration**: {:.2} seconds\n", ms as f64 / 1000.0));
    }
    md.push_str(&format!("- **Strategy**: {}\n", session.strategy));
    md.push_str(&format!("- **Page Budget**: {}\n", session.page_budget));
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    if let Some(info) = &session.character_info {
        md.push_str("## Character\n\n");
        md.push_str(&format!("- **Meaning**: {}\n", info.meaning));
        md.push_str(&format!("- **On'yomi**: {}\n", info.onyomi.join("、")));
        md.push_str(&format!("- **Kun'yomi**: {}\n", info.kunyomi.join("、")));
        if !info.info.is_empty() {
            md.push_str(&format!("- **Info**: {}\n", info.info));
        }
        md.push('\n');
    }

    // Overall statistics
    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_fetched));
    md.push_str(&format!(
        "- **Last Page**: {}\n",
        stats
            .last_valid_page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "not reached".to_string())
    ));
    md.push_str(&format!("- **Records Scanned**: {}\n", stats.entries_scanned));
    md.push_str(&format!(
        "- **Records Matched**: {} ({:.1}%)\n",
        stats.entries_matched,
        stats.match_rate()
    ));
    md.push_str(&format!(
        "- **Duplicates Dropped**: {}\n",
        stats.duplicates_dropped
    ));
    md.push_str(&format!("- **Entries**: {}\n\n", stats.entries_merged));

    // Per-page breakdown
    md.push_str("## Pages\n\n");
    md.push_str("| Page | Status | Entries | Scanned | Next |\n");
    md.push_str("|------|--------|---------|---------|------|\n");
    for report in session.page_reports() {
        let next = match report.has_next_page {
            Some(true) => "yes",
            Some(false) => "no",
            None => "?",
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            report.page_index, report.status, report.entries_found, report.entries_scanned, next
        ));
    }
    md.push('\n');

    let failures: Vec<_> = session
        .page_reports()
        .into_iter()
        .filter(|r| r.status.is_warning())
        .collect();
    if !failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("The result is partial; these pages contributed nothing.\n\n");
        for report in failures {
            md.push_str(&format!(
                "- Page {}: {}\n",
                report.page_index,
                report.failure.as_deref().unwrap_or("unknown error")
            ));
        }
        md.push('\n');
    }

    if !session.merged_entries.is_empty() {
        md.push_str("## Entries\n\n");
        md.push_str("| # | Word | Reading | Meanings | Tags |\n");
        md.push_str("|---|------|---------|----------|------|\n");
        for (i, entry) in session.merged_entries.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                entry.surface_form,
                entry.reading,
                escape_cell(&entry.glosses.join("; ")),
                entry.tags.join(", ")
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps table cells on one row
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
