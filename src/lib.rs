//! Fetch papers from OpenReview and flag them by keyword expression.
//!
//! The matching core lives in [`normalize`], [`query`] and [`matcher`]; the
//! rest is the plumbing around it: the API client, CSV/JSON export and a
//! small search API.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod normalize;
pub mod paper;
pub mod query;
pub mod search;
pub mod stem;

pub use error::{Error, Result};
pub use matcher::{flag_keyword, matches, Matcher};
pub use normalize::{normalize, strip_spaces, Normalizer};
