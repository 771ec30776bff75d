//! Known-character filtering and kana conversion

use crate::ConfigError;
use std::collections::HashSet;

/// Offset between a hiragana code point and its katakana counterpart
const KANA_OFFSET: u32 = 0x60;

/// The set of characters a learner already knows
///
/// A scraped word is only kept when every character besides the target kanji
/// is in this set. Kana can be admitted wholesale with `allow_kana`, which
/// saves listing the syllabaries in the configuration.
#[derive(Debug, Clone, Default)]
pub struct KnownCharacters {
    chars: HashSet<char>,
    allow_kana: bool,
}

impl KnownCharacters {
    /// Builds the allow-list from a string of characters
    ///
    /// Whitespace and commas are ignored so the list may be written in any
    /// grouping. ASCII letters and digits are rejected.
    pub fn parse(list: &str, allow_kana: bool) -> Result<Self, ConfigError> {
        let mut chars = HashSet::new();

        for c in list.chars() {
            if c.is_whitespace() || c == ',' || c == '、' {
                continue;
            }
            if c.is_ascii() {
                return Err(ConfigError::InvalidCharacters(format!(
                    "ASCII character '{}' cannot be a known character",
                    c
                )));
            }
            chars.insert(c);
        }

        Ok(Self { chars, allow_kana })
    }

    /// Creates an allow-list from an iterator of characters
    pub fn from_chars(chars: impl IntoIterator<Item = char>, allow_kana: bool) -> Self {
        Self {
            chars: chars.into_iter().collect(),
            allow_kana,
        }
    }

    /// Returns true if the character is on the list (or is kana when allowed)
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c) || (self.allow_kana && is_kana(c))
    }

    /// Number of explicitly listed characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if no characters are explicitly listed
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Checks whether a word qualifies as vocabulary for `target`
    ///
    /// The word must contain the target at least once, and every other
    /// character must be known.
    pub fn admits(&self, word: &str, target: char) -> bool {
        if word.is_empty() || !word.contains(target) {
            return false;
        }

        word.chars().all(|c| c == target || self.contains(c))
    }
}

/// Returns true for hiragana, katakana and the prolonged sound mark
pub fn is_kana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

/// Returns true for CJK ideographs and the iteration mark `々`
pub fn is_kanji(c: char) -> bool {
    matches!(
        c,
        '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2FA1F}'
            | '々'
    )
}

/// Converts katakana in `text` to hiragana, leaving everything else untouched
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ァ'..='ヶ' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Converts hiragana in `text` to katakana, leaving everything else untouched
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ぁ'..='ゖ' => char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}
