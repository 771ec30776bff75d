/// Shortens a dictionary tag label
///
/// | Label | Short form |
/// |-------|------------|
/// | `JLPT N5` | `N5` |
/// | `Wanikani level 29` | `WN29` |
/// | `Common word` | `CMN` |
///
/// Anything else is returned trimmed but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use kanji_vocab::vocab::shorten_tag;
///
/// assert_eq!(shorten_tag("JLPT N3"), "N3");
/// assert_eq!(shorten_tag("Wanikani level 8"), "WN8");
/// ```
pub fn shorten_tag(tag: &str) -> String {
    let tag = tag.trim();

    if let Some(level) = tag.strip_prefix("JLPT N") {
        if is_number(level) {
            return format!("N{}", level);
        }
    }

    if let Some(level) = tag.strip_prefix("Wanikani level ") {
        if is_number(level) {
            return format!("WN{}", level);
        }
    }

    if tag == "Common word" {
        return "CMN".to_string();
    }

    tag.to_string()
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
