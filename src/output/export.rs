//! Entry selection and flashcard export
//!
//! Selected entries are written as tab-separated rows that flashcard
//! programs import directly: word, reading, numbered meanings joined with
//! `<br>`, and space-separated tags.

use crate::output::{OutputError, OutputResult};
use crate::vocab::Entry;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Parses a selection like `1,3-5` into 0-based entry indices
///
/// Numbers are 1-based positions in the displayed list. `all` or `*` selects
/// everything. Indices come back in the order given, without repeats.
///
/// # Arguments
///
/// * `input` - The selection text
/// * `count` - Number of entries available
///
/// # Returns
///
/// * `Ok(Vec<usize>)` - 0-based indices
/// * `Err(OutputError::InvalidSelection)` - Malformed or out of range
///
/// # Example
///
/// ```
/// use kanji_vocab::output::parse_selection;
///
/// assert_eq!(parse_selection("1,3-5", 6).unwrap(), vec![0, 2, 3, 4]);
/// assert!(parse_selection("7", 6).is_err());
/// ```
pub fn parse_selection(input: &str, count: usize) -> OutputResult<Vec<usize>> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("all") || input == "*" {
        return Ok((0..count).collect());
    }

    let mut seen = HashSet::new();
    let mut indices = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse_position(start, count)?, parse_position(end, count)?),
            None => {
                let position = parse_position(part, count)?;
                (position, position)
            }
        };

        if start > end {
            return Err(OutputError::InvalidSelection(format!(
                "range '{}' runs backwards",
                part
            )));
        }

        for position in start..=end {
            if seen.insert(position) {
                indices.push(position - 1);
            }
        }
    }

    if indices.is_empty() {
        return Err(OutputError::InvalidSelection(
            "nothing selected".to_string(),
        ));
    }

    Ok(indices)
}

fn parse_position(text: &str, count: usize) -> OutputResult<usize> {
    let position: usize = text.trim().parse().map_err(|_| {
        OutputError::InvalidSelection(format!("'{}' is not a number", text.trim()))
    })?;

    if position == 0 || position > count {
        return Err(OutputError::InvalidSelection(format!(
            "{} is out of range 1-{}",
            position, count
        )));
    }

    Ok(position)
}

/// Picks entries by 0-based index, skipping indices out of range
pub fn select_entries<'a>(entries: &'a [Entry], indices: &[usize]) -> Vec<&'a Entry> {
    indices.iter().filter_map(|&i| entries.get(i)).collect()
}

/// Formats one entry as a TSV row (without the trailing newline)
pub fn format_tsv_row(entry: &Entry) -> String {
    let glosses = entry
        .glosses
        .iter()
        .enumerate()
        .map(|(i, gloss)| format!("{}. {}", i + 1, gloss))
        .collect::<Vec<_>>()
        .join("<br>");

    let tags = entry
        .tags
        .iter()
        .map(|tag| tag.replace(char::is_whitespace, "_"))
        .collect::<Vec<_>>()
        .join(" ");

    [
        clean_field(&entry.surface_form),
        clean_field(&entry.reading),
        clean_field(&glosses),
        clean_field(&tags),
    ]
    .join("\t")
}

/// Formats entries as TSV, one row per entry
pub fn format_tsv(entries: &[&Entry]) -> String {
    entries
        .iter()
        .map(|entry| format_tsv_row(entry) + "\n")
        .collect()
}

/// Writes entries to a TSV file and returns the number of rows written
pub fn export_tsv(entries: &[&Entry], path: &Path) -> OutputResult<usize> {
    let mut file = File::create(path)?;
    file.write_all(format_tsv(entries).as_bytes())?;

    tracing::info!("Exported {} entries to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Tabs and newlines would break the row structure
fn clean_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}
