//! Inference over a built token lookup
//!
//! Scoring is a sum of log-tallies: every occurrence of a known token adds
//! its per-category scores to the scoreboard. No normalisation, so scores are
//! only comparable within one call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One category's score for a token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scorer {
    /// Category index
    pub category: usize,
    /// Natural log of the category's tally for the token
    pub score: f32,
}

/// Best category for a token sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction<'a> {
    pub index: usize,
    pub category: &'a str,
    pub score: f64,
}

/// Inference state: category names plus token -> per-category scores.
///
/// This is all that gets persisted. Training state lives in
/// [`Trainer`](super::Trainer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub(crate) categories: Vec<String>,
    pub(crate) lookup: HashMap<String, Vec<Scorer>>,
}

impl Classifier {
    /// Classifier with categories and an empty lookup
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            lookup: HashMap::new(),
        }
    }

    /// Category names in index order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of tokens with at least one score
    pub fn vocabulary_size(&self) -> usize {
        self.lookup.len()
    }

    /// Scores for a token, ordered by category index
    pub fn scorers(&self, token: &str) -> Option<&[Scorer]> {
        self.lookup.get(token).map(Vec::as_slice)
    }

    pub(crate) fn lookup(&self) -> &HashMap<String, Vec<Scorer>> {
        &self.lookup
    }

    /// Score tokens against every category.
    ///
    /// Returns one entry per category, in index order. Repeated tokens count
    /// every time; unknown tokens are ignored.
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f64> {
        let mut scoreboard = vec![0.0f64; self.categories.len()];
        for tok in tokens {
            if let Some(rules) = self.lookup.get(tok.as_ref()) {
                for rule in rules {
                    scoreboard[rule.category] += f64::from(rule.score);
                }
            }
        }
        scoreboard
    }

    /// Pick the category with the strictly highest score.
    ///
    /// The scan starts at category 0 with score 0, so ties (and an all-zero or
    /// all-negative scoreboard) go to the lowest index. `None` only when no
    /// categories are defined.
    pub fn classify_simple<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Prediction<'_>> {
        if self.categories.is_empty() {
            return None;
        }

        let scoreboard = self.classify(tokens);
        let mut best_score = 0.0f64;
        let mut best_cat = 0usize;
        for (cat, &score) in scoreboard.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_cat = cat;
            }
        }

        Some(Prediction {
            index: best_cat,
            category: &self.categories[best_cat],
            score: best_score,
        })
    }
}
