//! Keyword-overlap relevance ranking

use std::collections::HashSet;

use crate::types::Fragment;

/// Search result with fragment and overlap score
#[derive(Debug, Clone)]
pub struct ScoredFragment<'a> {
    /// The matching fragment
    pub fragment: &'a Fragment,
    /// Number of distinct query words found in the fragment
    pub score: usize,
}

/// Bag-of-words ranker. Score is the size of the intersection between the
/// query's word set and the fragment's word set, case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRanker;

impl KeywordRanker {
    pub fn new() -> Self {
        Self
    }

    /// Top `top_k` fragments by overlap score. Fragments with no shared words
    /// are dropped; ties keep their original order.
    pub fn rank<'a>(&self, query: &str, fragments: &'a [Fragment], top_k: usize) -> Vec<ScoredFragment<'a>> {
        let query_words = word_set(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredFragment<'a>> = fragments
            .iter()
            .filter_map(|fragment| {
                let fragment_words = word_set(&fragment.text);
                let score = query_words.intersection(&fragment_words).count();
                (score > 0).then_some(ScoredFragment { fragment, score })
            })
            .collect();

        // Stable: equal scores stay in document order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(top_k);

        tracing::debug!(
            "Ranked {} fragments, kept {} (top scores: {:?})",
            fragments.len(),
            scored.len(),
            scored.iter().map(|s| s.score).collect::<Vec<_>>()
        );

        scored
    }

    /// Owned copies of the top fragments
    pub fn top_fragments(&self, query: &str, fragments: &[Fragment], top_k: usize) -> Vec<Fragment> {
        self.rank(query, fragments, top_k)
            .into_iter()
            .map(|s| s.fragment.clone())
            .collect()
    }
}

/// Lower-cased whitespace-separated words
fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}
