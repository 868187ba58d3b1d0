//! Fragment retrieval

mod search;

pub use search::{KeywordRanker, ScoredFragment};
