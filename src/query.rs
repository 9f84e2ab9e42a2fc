//! Keyword expressions: an OR of alternatives, each a single term or an AND group.
//!
//! Expressions are parsed from already-normalized keyword strings and
//! evaluated against already-normalized text. Only one level of nesting
//! exists; `" or "` splits first, then `" and "` within each alternative.

use crate::normalize::strip_spaces;

const OR: &str = " or ";
const AND: &str = " and ";

/// A single stemmed term or phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf(String);

impl Leaf {
    pub fn new(term: impl Into<String>) -> Self {
        Self(term.into())
    }

    /// Substring match, falling back to the term with its spaces removed
    /// so "zero shot" still finds "zeroshot".
    pub fn matches(&self, text: &str) -> bool {
        text.contains(self.0.as_str()) || text.contains(strip_spaces(&self.0).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    Leaf(Leaf),
    /// Every leaf must match.
    All(Vec<Leaf>),
}

impl Alternative {
    fn parse(keyword: &str) -> Self {
        if keyword.contains(AND) {
            Alternative::All(keyword.split(AND).map(Leaf::new).collect())
        } else {
            Alternative::Leaf(Leaf::new(keyword))
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Alternative::Leaf(leaf) => leaf.matches(text),
            Alternative::All(leaves) => leaves.iter().all(|leaf| leaf.matches(text)),
        }
    }
}

/// Any alternative matching makes the expression match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    alternatives: Vec<Alternative>,
}

impl Expression {
    /// Parse a normalized keyword string. Never fails: an empty keyword is a
    /// single empty leaf, which matches every text.
    pub fn parse(keyword: &str) -> Self {
        let alternatives = if keyword.contains(OR) {
            keyword.split(OR).map(Alternative::parse).collect()
        } else {
            vec![Alternative::parse(keyword)]
        };
        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn matches(&self, text: &str) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(text))
    }
}
