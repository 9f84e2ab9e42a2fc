//! Stemming capability used by the normalizer.

use std::borrow::Cow;
use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};

/// Reduces a word to the stem shared by its morphological variants.
///
/// Implementations must be deterministic and free of side effects.
pub trait Stem: Send + Sync {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

/// Snowball stemmer backed by `rust_stemmers`.
pub struct Snowball(Stemmer);

impl Snowball {
    pub fn new(algorithm: Algorithm) -> Self {
        Self(Stemmer::create(algorithm))
    }
}

/// Upper bound on re-stemming; Snowball reaches a fixed point in a few passes.
const MAX_PASSES: usize = 8;

impl Stem for Snowball {
    /// Stems repeatedly until the output no longer changes, so a stem is
    /// always its own stem ("agree" -> "agre" -> "agr").
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(word);
        for _ in 0..MAX_PASSES {
            if current.is_empty() {
                break;
            }
            let next = self.0.stem(&current).into_owned();
            if next == *current {
                break;
            }
            current = Cow::Owned(next);
        }
        current
    }
}

static ENGLISH: OnceLock<Snowball> = OnceLock::new();

/// Process-wide English stemmer, built on first use.
pub fn english() -> &'static Snowball {
    ENGLISH.get_or_init(|| Snowball::new(Algorithm::English))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stems_inflections_to_same_root() {
        let s = english();
        assert_eq!(s.stem("running"), s.stem("runs"));
        assert_eq!(s.stem("networks"), "network");
        assert_eq!(s.stem("robustness"), s.stem("robust"));
    }

    #[test]
    fn test_stem_is_a_fixed_point() {
        let s = english();
        for word in ["agree", "aliases", "acceleration", "accidentally", "guarantees"] {
            let stem = s.stem(word);
            assert_eq!(s.stem(&stem), stem, "word: {word}");
        }
        assert_eq!(s.stem("agree"), "agr");
        assert_eq!(s.stem("agreed"), s.stem("agree"));
    }

    #[test]
    fn test_empty_word_stems_to_empty() {
        assert_eq!(english().stem(""), "");
    }

    #[test]
    fn test_english_is_shared_instance() {
        assert!(std::ptr::eq(english(), english()));
    }
}
