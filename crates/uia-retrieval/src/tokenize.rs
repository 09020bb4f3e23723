//! Lexical tokenizer shared by the BM25 index and query-side scoring.
//!
//! Mirrors `component8_rag.py::tokenize_lex`'s exact behavior: lowercase,
//! then split on runs of `[A-Za-z0-9_]+`. Deliberately looser than
//! `uia_core::textnorm::normalize` (no diacritic stripping) — BM25 token
//! identity must match the corpus tokenization byte-for-byte.

use std::sync::OnceLock;

use regex::Regex;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").unwrap())
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_re().find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_non_word_runs() {
        assert_eq!(tokenize("Data-Science, and ML!"), vec!["data", "science", "and", "ml"]);
    }

    #[test]
    fn keeps_underscores_and_digits() {
        assert_eq!(tokenize("model_v2 train"), vec!["model_v2", "train"]);
    }
}
