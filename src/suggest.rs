//! Fuzzy suggestions for words that have no entry.
//!
//! Ranking is a full scan of the vocabulary: every word is scored against the
//! input with a [`DistanceMetric`] and the `k` closest are kept, ordered by
//! distance and then by the word itself. There is no index, so the cost grows
//! linearly with the vocabulary.

pub mod distance;

use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{DictError, Result};
use crate::store::Store;

pub use distance::DistanceMetric;

/// Number of suggestions returned unless asked otherwise.
pub const DEFAULT_SUGGESTIONS: usize = 3;

/// A vocabulary word and its distance from the input.
///
/// Ordered by distance, then lexically by word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub distance: usize,
    pub word: String,
}

impl Candidate {
    /// Create a new candidate.
    pub fn new<S: Into<String>>(word: S, distance: usize) -> Self {
        Candidate {
            distance,
            word: word.into(),
        }
    }
}

/// Configuration for suggestion ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Maximum number of candidates to return.
    pub limit: usize,
    /// Distance used for ranking.
    pub metric: DistanceMetric,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            limit: DEFAULT_SUGGESTIONS,
            metric: DistanceMetric::default(),
        }
    }
}

/// Ranks vocabulary words against a query.
#[derive(Debug, Clone, Default)]
pub struct Suggester {
    config: SuggestConfig,
}

impl Suggester {
    /// Create a suggester with the default configuration.
    pub fn new() -> Self {
        Suggester::default()
    }

    /// Create a suggester with a custom configuration.
    pub fn with_config(config: SuggestConfig) -> Self {
        Suggester { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    /// Load the vocabulary of `store` and rank it against `input`.
    pub fn suggest(&self, store: &Store, input: &str) -> Result<Vec<Candidate>> {
        if self.config.limit == 0 {
            return Err(DictError::invalid_argument(
                "number of suggestions must be positive",
            ));
        }

        let vocabulary = store.vocabulary()?;
        log::debug!(
            "Ranking {} vocabulary words against {:?}",
            vocabulary.len(),
            input
        );
        Ok(rank(
            input,
            vocabulary.iter().map(String::as_str),
            self.config.limit,
            self.config.metric,
        ))
    }
}

/// Up to `k` vocabulary words of `store` closest to `input`, using Levenshtein
/// distance.
pub fn suggest(store: &Store, input: &str, k: usize) -> Result<Vec<Candidate>> {
    Suggester::with_config(SuggestConfig {
        limit: k,
        ..SuggestConfig::default()
    })
    .suggest(store, input)
}

/// Rank `candidates` by distance to `input` and return the `k` best, ascending
/// by `(distance, word)`.
///
/// Duplicate candidates are ranked independently.
pub fn rank<'a, I>(input: &str, candidates: I, k: usize, metric: DistanceMetric) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a str>,
{
    if k == 0 {
        return Vec::new();
    }

    let query: Vec<char> = input.chars().collect();
    let mut scratch: Vec<char> = Vec::new();
    // Max-heap holding the k best seen so far; the worst is on top.
    let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

    for word in candidates {
        scratch.clear();
        scratch.extend(word.chars());
        let distance = metric.distance_chars(&query, &scratch);

        if best.len() == k
            && let Some(worst) = best.peek()
            && (distance, word) >= (worst.distance, worst.word.as_str())
        {
            continue;
        }

        best.push(Candidate::new(word, distance));
        if best.len() > k {
            best.pop();
        }
    }

    best.into_sorted_vec()
}
