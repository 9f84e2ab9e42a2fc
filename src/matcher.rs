//! Keyword flagging: normalize both sides, then evaluate the keyword expression.

use rayon::prelude::*;

use crate::normalize::{fold_case, Normalizer};
use crate::query::Expression;

/// Stateless keyword matcher. Cheap to copy and safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    normalizer: Normalizer,
}

impl Matcher {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Parse a raw keyword expression such as `"privacy and federated or robust"`.
    pub fn compile(&self, keyword: &str) -> Expression {
        Expression::parse(&self.normalizer.normalize(&fold_case(keyword)))
    }

    pub fn normalize_text(&self, text: &str) -> String {
        self.normalizer.normalize(&fold_case(text))
    }

    pub fn matches(&self, text: &str, keyword: &str) -> bool {
        self.compile(keyword).matches(&self.normalize_text(text))
    }

    /// Same as [`Matcher::matches`] as a 0/1 flag for tabular export.
    pub fn flag(&self, text: &str, keyword: &str) -> u8 {
        u8::from(self.matches(text, keyword))
    }

    /// Flag every text against one keyword expression. Documents are
    /// evaluated in parallel; the output is in input order.
    pub fn flag_all<T>(&self, texts: &[T], keyword: &str) -> Vec<u8>
    where
        T: AsRef<str> + Sync,
    {
        let expr = self.compile(keyword);
        tracing::debug!(keyword, ?expr, documents = texts.len(), "flagging documents");
        texts
            .par_iter()
            .map(|text| u8::from(expr.matches(&self.normalize_text(text.as_ref()))))
            .collect()
    }
}

/// Does `text` match the keyword expression, using the default matcher.
pub fn matches(text: &str, keyword: &str) -> bool {
    Matcher::default().matches(text, keyword)
}

/// 0/1 form of [`matches`].
pub fn flag_keyword(text: &str, keyword: &str) -> u8 {
    Matcher::default().flag(text, keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_matches_either_term() {
        assert!(matches(
            "Robust Optimization for Neural Networks",
            "privacy or robust"
        ));
        assert!(!matches(
            "Robust Optimization for Neural Networks",
            "privacy or fairness"
        ));
    }

    #[test]
    fn test_and_matches_all_terms() {
        let text = "A study of differential privacy in federated learning";
        assert!(matches(text, "privacy and federated"));
        assert!(!matches(text, "privacy and robustness"));
    }

    #[test]
    fn test_and_within_or() {
        assert!(matches(
            "Robustness guarantees for adversarial training",
            "privacy and federated or robustness"
        ));
        assert!(!matches(
            "Robustness guarantees for adversarial training",
            "privacy and federated or fairness"
        ));
    }

    #[test]
    fn test_stemming_equivalence() {
        assert!(matches("The models were generalizing well", "generalize"));
        assert!(matches("Learning to rank", "learned"));
    }

    #[test]
    fn test_hyphen_and_spacing_variants() {
        assert!(matches("This is a zero shot method", "zero-shot"));
        assert!(matches("This is a zero-shot method", "zero shot"));
        assert!(matches("A zeroshot baseline", "zero-shot"));
    }

    #[test]
    fn test_absent_term_does_not_match() {
        assert!(!matches(
            "An analysis of image classifiers",
            "reinforcement learning"
        ));
        assert!(!matches("An analysis of image classifiers", "transformer"));
    }

    #[test]
    fn test_case_insensitive() {
        let pairs = [
            ("Robust Optimization for Neural Networks", "privacy or robust"),
            ("A study of differential privacy", "Privacy AND federated"),
            ("An analysis of image classifiers", "reinforcement learning"),
        ];
        for (text, keyword) in pairs {
            assert_eq!(
                matches(text, keyword),
                matches(&text.to_uppercase(), &keyword.to_uppercase()),
                "{text:?} / {keyword:?}"
            );
        }
    }

    #[test]
    fn test_case_insensitive_for_multichar_uppercase() {
        let pairs = [
            ("Strasse und Verkehr", "straße"),
            ("Die Straße", "strasse"),
            ("A ﬁle system", "FILE"),
            ("A file system", "ﬁle"),
        ];
        for (text, keyword) in pairs {
            assert!(matches(text, keyword), "{text:?} / {keyword:?}");
            assert_eq!(
                matches(text, keyword),
                matches(&text.to_uppercase(), &keyword.to_uppercase()),
                "{text:?} / {keyword:?}"
            );
        }
    }

    #[test]
    fn test_empty_keyword_always_matches() {
        assert!(matches("anything at all", ""));
        assert!(matches("", ""));
        assert_eq!(flag_keyword("", "!!!"), 1);
    }

    #[test]
    fn test_flag_is_zero_or_one() {
        assert_eq!(flag_keyword("Federated averaging", "federated"), 1);
        assert_eq!(flag_keyword("Federated averaging", "privacy"), 0);
    }

    #[test]
    fn test_flag_all_preserves_order() {
        let texts = vec![
            "Differential privacy for language models".to_string(),
            "Graph neural networks".to_string(),
            "Private federated learning".to_string(),
            "Robust training".to_string(),
        ];
        let flags = Matcher::default().flag_all(&texts, "privacy or robust");
        assert_eq!(flags, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_flag_all_agrees_with_single_calls() {
        let texts = [
            "Robustness guarantees for adversarial training",
            "A study of differential privacy in federated learning",
            "An analysis of image classifiers",
        ];
        let keyword = "privacy and federated or robustness";
        let matcher = Matcher::default();
        let expected: Vec<u8> = texts.iter().map(|t| matcher.flag(t, keyword)).collect();
        assert_eq!(matcher.flag_all(&texts, keyword), expected);
    }

    #[test]
    fn test_collapse_whitespace_mode_matches_same_terms() {
        let strict = Matcher::new(Normalizer::default().collapse_whitespace(true));
        assert!(strict.matches("Deep   reinforcement  learning", "reinforcement learning"));
        assert!(!matches("Deep   reinforcement  learning", "reinforcement learning"));
    }
}
