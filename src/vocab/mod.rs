//! Vocabulary data model and normalization
//!
//! This module holds the scraped record types and the small pure helpers that
//! clean them up: the known-character filter, tag and gloss shortening, and
//! on'yomi annotation of readings.

mod charset;
mod gloss;
mod reading;
mod tags;

use serde::{Deserialize, Serialize};

// Re-export main functions
pub use charset::{
    hiragana_to_katakana, is_kana, is_kanji, katakana_to_hiragana, KnownCharacters,
};
pub use gloss::shorten_gloss;
pub use reading::annotate_reading;
pub use tags::shorten_tag;

/// One vocabulary record scraped from a result page
///
/// Entries are only constructed for records that passed the known-character
/// filter, so `surface_form` always contains the target character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The written word or phrase; dedup key
    pub surface_form: String,

    /// Kana reading, possibly with on'yomi portions rewritten in katakana
    pub reading: String,

    /// One gloss per numbered meaning, in page order
    pub glosses: Vec<String>,

    /// Short classification labels (frequency, JLPT level, ...)
    pub tags: Vec<String>,
}

impl Entry {
    /// Creates an entry with no glosses or tags
    pub fn new(surface_form: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            surface_form: surface_form.into(),
            reading: reading.into(),
            glosses: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Builder-style gloss append
    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.glosses.push(gloss.into());
        self
    }

    /// Builder-style tag append; duplicate labels are ignored
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.push_tag(tag);
        self
    }

    /// Adds a tag unless an identical label is already present
    pub fn push_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Returns the glosses as a numbered, newline separated list
    pub fn numbered_glosses(&self) -> String {
        self.glosses
            .iter()
            .enumerate()
            .map(|(i, gloss)| format!("{}. {}", i + 1, gloss))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Readings and meaning of the target kanji itself
///
/// Only the first result page carries this block, so it is parsed once per
/// session and handed around explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    /// Sino-Japanese readings, in katakana as listed by the site
    pub onyomi: Vec<String>,

    /// Native readings with okurigana hyphens removed
    pub kunyomi: Vec<String>,

    /// English keywords for the character
    pub meaning: String,

    /// Stroke count, JLPT level and similar trivia
    pub info: String,
}

impl CharacterInfo {
    /// Returns true if no field carries any data
    pub fn is_empty(&self) -> bool {
        self.onyomi.is_empty()
            && self.kunyomi.is_empty()
            && self.meaning.is_empty()
            && self.info.is_empty()
    }
}
