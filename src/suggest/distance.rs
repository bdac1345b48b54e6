//! Edit distances used to rank suggestions.
//!
//! Both metrics work on Unicode scalar values, are symmetric, and return a finite
//! value for every pair of strings.

use std::cmp::min;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// String distance used to rank vocabulary candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// Insertions, deletions and substitutions cost 1.
    #[default]
    Levenshtein,
    /// Levenshtein plus adjacent transpositions at cost 1
    /// (optimal string alignment).
    DamerauLevenshtein,
}

impl DistanceMetric {
    /// Name of the metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Levenshtein => "levenshtein",
            DistanceMetric::DamerauLevenshtein => "damerau-levenshtein",
        }
    }

    /// Distance between two strings.
    pub fn distance(&self, a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        self.distance_chars(&a, &b)
    }

    /// Distance between two pre-split strings.
    pub fn distance_chars(&self, a: &[char], b: &[char]) -> usize {
        match self {
            DistanceMetric::Levenshtein => levenshtein(a, b),
            DistanceMetric::DamerauLevenshtein => damerau_levenshtein(a, b),
        }
    }
}

/// Levenshtein distance with two rows of working memory.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = min(min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Optimal string alignment distance: Levenshtein where swapping two adjacent
/// characters is a single edit. Keeps three rows.
pub fn damerau_levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut before: Vec<usize> = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = min(min(prev[j] + 1, curr[j - 1] + 1), prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = min(best, before[j - 2] + 1);
            }
            curr[j] = best;
        }
        std::mem::swap(&mut before, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        let lev = DistanceMetric::Levenshtein;
        assert_eq!(lev.distance("", ""), 0);
        assert_eq!(lev.distance("", "a"), 1);
        assert_eq!(lev.distance("a", ""), 1);
        assert_eq!(lev.distance("a", "a"), 0);
        assert_eq!(lev.distance("ab", "ac"), 1);
        assert_eq!(lev.distance("abc", "def"), 3);
        assert_eq!(lev.distance("kitten", "sitting"), 3);
        assert_eq!(lev.distance("search", "serach"), 2);
    }

    #[test]
    fn test_damerau_levenshtein_distance() {
        let osa = DistanceMetric::DamerauLevenshtein;
        assert_eq!(osa.distance("", ""), 0);
        assert_eq!(osa.distance("ab", "ba"), 1);
        assert_eq!(osa.distance("search", "serach"), 1);
        assert_eq!(osa.distance("kitten", "sitting"), 3);
        assert_eq!(osa.distance("ca", "abc"), 3);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let lev = DistanceMetric::Levenshtein;
        assert_eq!(lev.distance("café", "cafe"), 1);
        assert_eq!(lev.distance("naïve", "naive"), 1);
    }

    #[test]
    fn test_symmetric() {
        for metric in [DistanceMetric::Levenshtein, DistanceMetric::DamerauLevenshtein] {
            for (a, b) in [("hello", "yellow"), ("teh", "the"), ("", "abc")] {
                assert_eq!(metric.distance(a, b), metric.distance(b, a), "{}", metric.name());
            }
        }
    }

    #[test]
    fn test_common_typos() {
        let common_typos = vec![
            ("the", "teh"),
            ("search", "serach"),
            ("hello", "helo"),
            ("world", "wrold"),
            ("quick", "quikc"),
        ];

        for (correct, typo) in common_typos {
            let distance = DistanceMetric::Levenshtein.distance(correct, typo);
            assert!(distance <= 2, "Distance too high for {correct} -> {typo}: {distance}");

            let osa = DistanceMetric::DamerauLevenshtein.distance(correct, typo);
            assert!(osa <= distance);
        }
    }
}
