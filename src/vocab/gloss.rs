/// Part-of-speech labels and their abbreviations
///
/// Order matters: longer labels that contain shorter ones (`Noun which may
/// take...` vs `Noun`, the three `Usually written using kana alone` variants)
/// must be replaced first.
const GLOSS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Adverb (fukushi)", "adv"),
    ("Noun which may take the genitive case particle 'no'", "adjの"),
    ("Noun", "n"),
    ("Suru verb", "vする"),
    ("Transitive verb", "vt"),
    ("Intransitive verb", "vi"),
    ("Ichidan verb", "v1"),
    ("Godan verb", "v5"),
    ("Na-adjective (keiyodoshi)", "adjな"),
    ("I-adjective (keiyoushi)", "adjい"),
    ("Wikipedia definition", "wk"),
    ("Expressions (phrases, clauses, etc.)", "exp"),
    ("(Other forms)", "alt"),
    ("Conjunction", "conj"),
    ("Usually written using kana alone , usu. as", "KANA usu. AS:"),
    ("Usually written using kana alone , as", "KANA AS:"),
    ("Usually written using kana alone", "KANA"),
    ("Antonym:", "ANT:"),
    ("esp.", "ESP:"),
];

/// Compacts a gloss for flashcard use
///
/// Semicolons become commas, part-of-speech labels are abbreviated, and a
/// leading `to ` is dropped from later comma-separated parts once an earlier
/// part already started with it (`to eat, to drink` becomes `to eat, drink`).
///
/// # Examples
///
/// ```
/// use kanji_vocab::vocab::shorten_gloss;
///
/// assert_eq!(shorten_gloss("to enter; to go in (Godan verb)"), "to enter, go in (v5)");
/// ```
pub fn shorten_gloss(gloss: &str) -> String {
    let mut text = gloss.replace(';', ",");

    for (label, short) in GLOSS_ABBREVIATIONS {
        text = text.replace(label, short);
    }

    let mut seen_to = false;
    let mut parts = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.starts_with("to ") {
            if seen_to {
                parts.push(&part[3..]);
                continue;
            }
            seen_to = true;
        }
        parts.push(part);
    }

    parts.join(", ")
}
