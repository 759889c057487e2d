//! Text normalization shared by trigger, answer and auto-reply matching.
//!
//! `normalize` trims, lower-cases, strips diacritics (NFD, combining marks removed)
//! and collapses runs of whitespace to a single space.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into alphanumeric words, dropping punctuation.
pub fn words(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when the words of `phrase` occur as a contiguous run in `text`. Both sides are normalized first.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text = normalize(text);
    let phrase = normalize(phrase);
    let haystack = words(&text);
    let needle = words(&phrase);
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle.as_slice())
}
