//! HTML parser for dictionary result pages
//!
//! This module turns one fetched result page into a [`PageResult`]:
//! - Vocabulary records (surface form, reading, glosses, tags)
//! - The "more words" link that signals a further page
//! - The target kanji's readings and meaning (page 1 only)

use crate::state::PageResult;
use crate::vocab::{shorten_gloss, shorten_tag, CharacterInfo, Entry, KnownCharacters};
use crate::FetchError;
use scraper::{ElementRef, Html, Node, Selector};

/// Selectors whose presence marks a page as a recognizable results page
const LAYOUT_MARKERS: &[&str] = &["#main_results", "div.concept_light", "a.more", "#no-matches"];

/// Normalization applied while parsing
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Characters a word may contain besides the target
    pub known: KnownCharacters,

    /// Abbreviate tag labels (`JLPT N5` -> `N5`)
    pub shorten_tags: bool,

    /// Abbreviate part-of-speech labels inside glosses
    pub shorten_glosses: bool,
}

/// Parses a result page
///
/// # Record Rules
///
/// Every `div.concept_light` block counts toward `scanned_count`. A block
/// becomes an [`Entry`] only if it has a non-empty reading and its surface
/// form passes the known-character filter for `target`.
///
/// # Arguments
///
/// * `html` - The page body
/// * `target` - The kanji being searched
/// * `page_index` - 1-based page index; character info is only read on page 1
/// * `options` - Filtering and shortening options
///
/// # Returns
///
/// * `Ok(PageResult)` - Parsed page (possibly with no entries)
/// * `Err(FetchError::PermanentParse)` - The page is not a results page
pub fn parse_page(
    html: &str,
    target: char,
    page_index: u32,
    options: &ParseOptions,
) -> Result<PageResult, FetchError> {
    let document = Html::parse_document(html);

    if !is_results_layout(&document) {
        return Err(FetchError::PermanentParse {
            page: page_index,
            message: "no recognizable results layout".to_string(),
        });
    }

    let has_next_page = select_first(&document, "a.more").is_some();

    let mut entries = Vec::new();
    let mut scanned_count = 0;

    if let Ok(concept_selector) = Selector::parse("div.concept_light") {
        for block in document.select(&concept_selector) {
            scanned_count += 1;
            if let Some(entry) = parse_concept(block, target, options) {
                entries.push(entry);
            }
        }
    }

    tracing::trace!(
        "Page {}: {}/{} records kept, next page: {}",
        page_index,
        entries.len(),
        scanned_count,
        has_next_page
    );

    let mut result = PageResult::new(page_index, entries, has_next_page)
        .with_scanned_count(scanned_count);

    if page_index == 1 {
        result.character_info = extract_character_info(&document);
    }

    Ok(result)
}

fn is_results_layout(document: &Html) -> bool {
    LAYOUT_MARKERS
        .iter()
        .any(|css| select_first(document, css).is_some())
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn select_within<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Text content with runs of whitespace collapsed to single spaces
fn clean_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text content with all whitespace removed (for Japanese strings)
fn compact_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(|t| t.chars())
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Extracts one vocabulary record; `None` if it does not qualify
fn parse_concept(block: ElementRef, target: char, options: &ParseOptions) -> Option<Entry> {
    let surface_form = select_within(block, ".concept_light-representation .text")
        .map(compact_text)
        .unwrap_or_default();
    let reading = select_within(block, ".concept_light-representation .furigana")
        .map(compact_text)
        .unwrap_or_default();

    if reading.is_empty() || !options.known.admits(&surface_form, target) {
        return None;
    }

    let mut entry = Entry::new(surface_form, reading);

    if let Ok(tag_selector) = Selector::parse(".concept_light-tag.label") {
        for tag in block.select(&tag_selector) {
            let label = clean_text(tag);
            if options.shorten_tags {
                entry.push_tag(shorten_tag(&label));
            } else {
                entry.push_tag(label);
            }
        }
    }

    if let Some(wrapper) = select_within(block, "div.meanings-wrapper") {
        for gloss in extract_glosses(wrapper) {
            if options.shorten_glosses {
                entry.glosses.push(shorten_gloss(&gloss));
            } else {
                entry.glosses.push(gloss);
            }
        }
    }

    Some(entry)
}

/// Walks the meanings wrapper in document order
///
/// A `div.meaning-tags` header (part of speech) applies to the meaning that
/// follows it.
fn extract_glosses(wrapper: ElementRef) -> Vec<String> {
    let mut glosses = Vec::new();
    let mut pending_tag: Option<String> = None;

    for child in wrapper.children().filter_map(ElementRef::wrap) {
        let classes: Vec<&str> = child.value().classes().collect();

        if classes.contains(&"meaning-tags") {
            pending_tag = Some(clean_text(child)).filter(|t| !t.is_empty());
        } else if classes.contains(&"meaning-wrapper") {
            let tag = pending_tag.take();
            if let Some(gloss) = format_gloss(child, tag.as_deref()) {
                glosses.push(gloss);
            }
        }
    }

    glosses
}

fn format_gloss(meaning: ElementRef, tag: Option<&str>) -> Option<String> {
    let text = select_within(meaning, "span.meaning-meaning").map(clean_text)?;
    if text.is_empty() {
        return None;
    }

    let mut gloss = text;
    if let Some(tag) = tag {
        gloss.push_str(&format!(" ({})", tag));
    }

    if let Some(info) = select_within(meaning, "span.supplemental_info").map(clean_text) {
        if !info.is_empty() {
            gloss.push_str(&format!(" 【{}】", info));
        }
    }

    if let Some(sentence) = select_within(meaning, "div.sentence") {
        if let Some(example) = format_sentence(sentence) {
            gloss.push_str(&format!(" {}", example));
        }
    }

    Some(gloss)
}

/// Renders an example sentence as `「漢字[かな]...」 English`
fn format_sentence(sentence: ElementRef) -> Option<String> {
    let japanese = select_within(sentence, "ul.japanese_sentence")?;
    let mut text = String::new();

    for child in japanese.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t.trim()),
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                let furigana = select_within(element, ".furigana")
                    .map(compact_text)
                    .unwrap_or_default();
                let word = select_within(element, ".unlinked")
                    .map(compact_text)
                    .unwrap_or_else(|| compact_text(element));

                if furigana.is_empty() {
                    text.push_str(&word);
                } else {
                    text.push_str(&format!("{}[{}]", word, furigana));
                }
            }
            _ => {}
        }
    }

    if text.is_empty() {
        return None;
    }

    match select_within(sentence, ".english").map(clean_text) {
        Some(english) if !english.is_empty() => Some(format!("「{}」 {}", text, english)),
        _ => Some(format!("「{}」", text)),
    }
}

/// Reads the kanji block that heads the first result page
fn extract_character_info(document: &Html) -> Option<CharacterInfo> {
    let block = select_first(document, "div.kanji_light_content")?;

    let onyomi = select_within(block, "div.on.readings")
        .map(|el| split_readings(&clean_text(el), "On:", false))
        .unwrap_or_default();
    let kunyomi = select_within(block, "div.kun.readings")
        .map(|el| split_readings(&clean_text(el), "Kun:", true))
        .unwrap_or_default();
    let meaning = select_within(block, "div.meanings.english.sense")
        .map(clean_text)
        .unwrap_or_default();
    let info = select_within(block, "div.info.clearfix")
        .map(clean_text)
        .unwrap_or_default();

    let info = CharacterInfo {
        onyomi,
        kunyomi,
        meaning,
        info,
    };

    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

/// Splits `On: ジン、 ニン` style lists into individual readings
fn split_readings(text: &str, label: &str, strip_hyphens: bool) -> Vec<String> {
    let text = text.trim();
    let text = text.strip_prefix(label).unwrap_or(text);

    text.split('、')
        .map(|reading| {
            let reading = reading.trim();
            if strip_hyphens {
                reading.replace('-', "")
            } else {
                reading.to_string()
            }
        })
        .filter(|reading| !reading.is_empty())
        .collect()
}
