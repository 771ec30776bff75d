use super::charset::katakana_to_hiragana;
use super::CharacterInfo;

/// Marks the on'yomi portions of a reading by writing them in katakana
///
/// Each on'yomi of the target kanji is compared in hiragana form against the
/// reading; matches are replaced with the katakana spelling, so `にんげん` for
/// 人間 becomes `ニンげん`. Kun'yomi portions stay in hiragana. Every on'yomi
/// is applied in the order the site lists them, and every occurrence is
/// rewritten.
pub fn annotate_reading(reading: &str, info: &CharacterInfo) -> String {
    let mut result = reading.to_string();

    for onyomi in &info.onyomi {
        let katakana: String = onyomi
            .chars()
            .filter(|c| !matches!(c, '-' | '.' | ' '))
            .collect();
        let hiragana = katakana_to_hiragana(&katakana);

        if hiragana.is_empty() || hiragana == katakana {
            continue;
        }

        if result.contains(&hiragana) {
            result = result.replace(&hiragana, &katakana);
        }
    }

    result
}
