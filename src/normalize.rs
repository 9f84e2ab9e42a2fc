//! Text normalization: lowercase, hyphens to spaces, strip punctuation, stem each token.

use std::sync::OnceLock;

use regex::Regex;

use crate::stem::{self, Stem};

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Normalizes raw text into a string of stemmed tokens joined by single spaces.
#[derive(Clone, Copy)]
pub struct Normalizer {
    stemmer: &'static dyn Stem,
    collapse_whitespace: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(stem::english())
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("collapse_whitespace", &self.collapse_whitespace)
            .finish_non_exhaustive()
    }
}

impl Normalizer {
    pub fn new(stemmer: &'static dyn Stem) -> Self {
        Self {
            stemmer,
            collapse_whitespace: false,
        }
    }

    /// Drop the empty tokens that repeated spaces produce instead of
    /// keeping them as empty segments.
    pub fn collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    pub fn normalize(&self, text: &str) -> String {
        let lowered = fold_case(text).replace('-', " ");
        let cleaned = punctuation().replace_all(&lowered, "");
        // Split on single spaces only: "a  b" yields an empty middle token.
        let stemmed: Vec<_> = cleaned
            .split(' ')
            .filter(|token| !self.collapse_whitespace || !token.is_empty())
            .map(|token| self.stemmer.stem(token))
            .collect();
        stemmed.join(" ")
    }
}

/// Lowercase through uppercase so that characters with multi-character
/// uppercase forms fold the same way as their capitals ("ß" -> "ss").
pub fn fold_case(text: &str) -> String {
    text.to_uppercase().to_lowercase()
}

/// Normalize with the shared English stemmer, preserving empty tokens.
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

/// Remove every run of spaces, e.g. "zero shot" -> "zeroshot".
pub fn strip_spaces(text: &str) -> String {
    text.replace(' ', "")
}
