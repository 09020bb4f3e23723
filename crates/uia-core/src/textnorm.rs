//! Text normalization used by alias matching (catalog aliases, intent lexicon hints).
//!
//! Mirrors the originating system's `normalize()` helper: trim, lowercase,
//! strip diacritics, collapse non-word runs to single spaces.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize text for alias/lexicon comparison.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let decomposed: String = lowered.nfkd().filter(|c| !is_combining(*c)).collect();
    let no_punct = non_word_re().replace_all(&decomposed, " ");
    whitespace_re().replace_all(&no_punct, " ").trim().to_string()
}

fn is_combining(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_lowercases() {
        assert_eq!(normalize("Café ML"), "cafe ml");
    }

    #[test]
    fn collapses_whitespace_and_punctuation() {
        assert_eq!(normalize("  Data-Science,  Pro!  "), "data-science pro");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize(""), "");
    }
}
