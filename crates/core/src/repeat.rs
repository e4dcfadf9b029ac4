//! Near-Duplicate Question Detection
//!
//! The model is told not to repeat itself, but it regularly rephrases a
//! question it already asked. This module reduces questions to token sets and
//! flags a candidate as a repeat when it overlaps too much with, or is contained
//! in, any question already in the game log.

use crate::game_types::HistoryEntry;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words that carry no information about *which* attribute a question probes.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "am", "do", "does",
    "did", "has", "have", "had", "it", "its", "this", "that", "these", "those", "they", "them",
    "their", "who", "he", "she", "his", "her", "him", "you", "your", "i", "me", "my", "we", "our",
    "of", "in", "on", "at", "to", "for", "from", "with", "by", "as", "or", "and", "any", "ever",
    "someone", "somebody", "something", "person", "people", "character", "thing", "one",
    "repeat", "same", "again", "still", "male", "female", "known", "considered", "kind", "type",
    "sort", "really", "very", "mostly", "usually", "often", "typically",
];

/// Jaccard similarity at or above which two questions count as the same.
pub const SIMILARITY_THRESHOLD: f64 = 0.70;

static DEFAULT_DETECTOR: Lazy<RepeatDetector> = Lazy::new(RepeatDetector::default);

/// Lowercases `text`, maps everything outside `[a-z0-9 ]` to a space and
/// collapses whitespace runs.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `|a ∩ b| / |a ∪ b|`, defined as 0 when both sets are empty.
pub fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Checks `candidate` against every question in `history` using the default
/// stop-word list and threshold.
pub fn is_repeat(candidate: &str, history: &[HistoryEntry]) -> bool {
    DEFAULT_DETECTOR.is_repeat(candidate, history)
}

/// A configured duplicate detector.
#[derive(Debug, Clone)]
pub struct RepeatDetector {
    stop_words: HashSet<String>,
    threshold: f64,
}

impl Default for RepeatDetector {
    fn default() -> Self {
        Self::new(STOP_WORDS.iter().copied(), SIMILARITY_THRESHOLD)
    }
}

impl RepeatDetector {
    pub fn new<'a>(stop_words: impl IntoIterator<Item = &'a str>, threshold: f64) -> Self {
        Self {
            stop_words: stop_words.into_iter().map(str::to_string).collect(),
            threshold,
        }
    }

    /// Splits an already-normalized string into its informative tokens.
    pub fn tokens(&self, normalized: &str) -> HashSet<String> {
        normalized
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Returns `true` on the first prior question that the candidate duplicates.
    pub fn is_repeat(&self, candidate: &str, history: &[HistoryEntry]) -> bool {
        let candidate_norm = normalize(candidate);
        let candidate_tokens = self.tokens(&candidate_norm);

        history.iter().any(|entry| {
            let prior_norm = normalize(&entry.q);
            if contains_either_way(&candidate_norm, &prior_norm) {
                return true;
            }
            similarity(&candidate_tokens, &self.tokens(&prior_norm)) >= self.threshold
        })
    }
}

// An empty string is a substring of everything, so it only matches another empty string.
fn contains_either_way(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    a.contains(b) || b.contains(a)
}
