//! Threshold tuning against held-out documents
//!
//! Brute-force search over every (allowance, maxscore) pair of a
//! [`SearchGrid`]. The ensemble is sampled once; each pair only re-runs the
//! aggregation and the held-out classification.

use super::aggregate::Thresholds;
use super::trainer::Trainer;
use super::{ClassifierError, ClassifierResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default allowance candidates, loosest first
pub const DEFAULT_ALLOWANCES: [f64; 51] = [
    0.0, 1.05, 1.1, 1.15, 1.2, 1.25, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 2.5, 3.0, 4.0, 5.0,
    6.0, 7.0, 8.0, 9.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 75.0, 100.0, 150.0, 200.0,
    300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0, 1500.0, 2000.0, 3000.0, 4000.0,
    5000.0, 10000.0, 20000.0, 50000.0, 100000.0, 1000000.0,
];

/// Default maxscore candidates, unbounded first, then tightening
pub const DEFAULT_MAXSCORES: [f64; 46] = [
    0.0, 10000000.0, 1000000.0, 100000.0, 50000.0, 20000.0, 10000.0, 5000.0, 4000.0, 3000.0,
    2000.0, 1500.0, 1200.0, 1000.0, 900.0, 800.0, 700.0, 600.0, 550.0, 500.0, 475.0, 450.0,
    425.0, 400.0, 375.0, 350.0, 325.0, 300.0, 275.0, 250.0, 225.0, 200.0, 150.0, 100.0, 75.0,
    50.0, 40.0, 30.0, 25.0, 20.0, 15.0, 10.0, 8.0, 6.0, 4.0, 2.0,
];

/// Candidate values for both thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchGrid {
    allowances: Vec<f64>,
    maxscores: Vec<f64>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            allowances: DEFAULT_ALLOWANCES.to_vec(),
            maxscores: DEFAULT_MAXSCORES.to_vec(),
        }
    }
}

impl SearchGrid {
    /// Grid from explicit candidate lists.
    ///
    /// Both lists must be non-empty and hold finite, non-negative values.
    pub fn new(allowances: Vec<f64>, maxscores: Vec<f64>) -> ClassifierResult<Self> {
        check_candidates("allowance", &allowances)?;
        check_candidates("maxscore", &maxscores)?;
        Ok(Self {
            allowances,
            maxscores,
        })
    }

    pub fn allowances(&self) -> &[f64] {
        &self.allowances
    }

    pub fn maxscores(&self) -> &[f64] {
        &self.maxscores
    }

    /// Number of combinations tried by a search
    pub fn len(&self) -> usize {
        self.allowances.len() * self.maxscores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every pair, allowance-major
    pub fn points(&self) -> impl Iterator<Item = Thresholds> + '_ {
        self.allowances.iter().flat_map(move |&allowance| {
            self.maxscores
                .iter()
                .map(move |&maxscore| Thresholds::new(allowance, maxscore))
        })
    }
}

fn check_candidates(name: &str, values: &[f64]) -> ClassifierResult<()> {
    if values.is_empty() {
        return Err(ClassifierError::InvalidGrid(format!(
            "no {name} candidates"
        )));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(ClassifierError::InvalidGrid(format!(
            "{name} candidate {bad} must be finite and >= 0"
        )));
    }
    Ok(())
}

/// Held-out accuracy of one lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

/// Result for one grid combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub allowance: f64,
    pub maxscore: f64,
    pub evaluation: Evaluation,
}

/// Best combination found by a search
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub best: GridPoint,
    /// Number of combinations evaluated
    pub combinations: usize,
}

impl SearchOutcome {
    pub fn allowance(&self) -> f64 {
        self.best.allowance
    }

    pub fn maxscore(&self) -> f64 {
        self.best.maxscore
    }

    pub fn accuracy(&self) -> f64 {
        self.best.evaluation.accuracy
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.best.allowance, self.best.maxscore)
    }
}

impl<R: Rng> Trainer<R> {
    /// Accuracy of the current lookup on the held-out documents
    pub fn evaluate(&self) -> ClassifierResult<Evaluation> {
        let docs = self.corpus.test_docs();
        if docs.is_empty() {
            return Err(ClassifierError::NoTestDocuments);
        }

        let correct = docs
            .iter()
            .filter(|doc| {
                self.classifier
                    .classify_simple(&doc.tokens)
                    .is_some_and(|p| p.index == doc.category)
            })
            .count();

        Ok(Evaluation {
            correct,
            total: docs.len(),
            accuracy: correct as f64 / docs.len() as f64,
        })
    }

    /// Search the default grid for the most accurate thresholds.
    ///
    /// The lookup is left as built by the last combination tried; call
    /// [`create`](Self::create) with the returned thresholds to get the best
    /// classifier.
    pub fn test(&mut self, verbose: bool) -> ClassifierResult<SearchOutcome> {
        self.test_with_grid(&SearchGrid::default(), verbose, |_| {})
    }

    /// Search a custom grid, calling `observer` after every combination.
    ///
    /// Ties keep the earliest combination.
    pub fn test_with_grid<F>(
        &mut self,
        grid: &SearchGrid,
        verbose: bool,
        mut observer: F,
    ) -> ClassifierResult<SearchOutcome>
    where
        F: FnMut(&GridPoint),
    {
        if self.corpus.test_docs().is_empty() {
            return Err(ClassifierError::NoTestDocuments);
        }

        tracing::info!(
            "Searching {} threshold combinations over {} test documents",
            grid.len(),
            self.corpus.test_docs().len()
        );

        let mut best: Option<GridPoint> = None;
        for thresholds in grid.points() {
            self.create(thresholds.allowance, thresholds.maxscore);
            let point = GridPoint {
                allowance: thresholds.allowance,
                maxscore: thresholds.maxscore,
                evaluation: self.evaluate()?,
            };

            if verbose {
                tracing::info!(
                    "allowance {}, maxscore {} = {:.6} ({} correct)",
                    point.allowance,
                    point.maxscore,
                    point.evaluation.accuracy,
                    point.evaluation.correct
                );
            } else {
                tracing::debug!(
                    "allowance {}, maxscore {} = {:.6}",
                    point.allowance,
                    point.maxscore,
                    point.evaluation.accuracy
                );
            }
            observer(&point);

            if best.map_or(true, |b| point.evaluation.accuracy > b.evaluation.accuracy) {
                best = Some(point);
            }
        }

        // Grids are never empty, so at least one point was evaluated
        let best = best.ok_or_else(|| ClassifierError::InvalidGrid("empty grid".into()))?;
        if verbose {
            tracing::info!(
                "Best result: allowance {}, maxscore {} = {:.6}",
                best.allowance,
                best.maxscore,
                best.evaluation.accuracy
            );
        }

        Ok(SearchOutcome {
            best,
            combinations: grid.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn trained() -> Trainer<ChaCha8Rng> {
        let mut trainer = Trainer::with_seed(17);
        trainer.define_categories(&["spam", "ham"]).unwrap();
        trainer
            .add_training_doc("spam", &["buy", "buy", "buy", "buy", "cheap", "cheap"])
            .unwrap();
        trainer
            .add_training_doc("ham", &["hello", "hello", "hello", "meeting"])
            .unwrap();
        trainer.add_test_doc("spam", &["buy", "cheap"]).unwrap();
        trainer.add_test_doc("ham", &["hello"]).unwrap();
        trainer
    }

    #[test]
    fn test_default_grid_size() {
        let grid = SearchGrid::default();
        assert_eq!(grid.allowances().len(), 51);
        assert_eq!(grid.maxscores().len(), 46);
        assert_eq!(grid.len(), 2346);
        assert_eq!(grid.points().count(), grid.len());
    }

    #[test]
    fn test_points_are_allowance_major() {
        let grid = SearchGrid::new(vec![0.0, 2.0], vec![0.0, 5.0, 9.0]).unwrap();
        let points: Vec<_> = grid.points().collect();
        assert_eq!(points[0], Thresholds::new(0.0, 0.0));
        assert_eq!(points[2], Thresholds::new(0.0, 9.0));
        assert_eq!(points[3], Thresholds::new(2.0, 0.0));
    }

    #[test]
    fn test_invalid_grids_rejected() {
        assert!(matches!(
            SearchGrid::new(vec![], vec![1.0]),
            Err(ClassifierError::InvalidGrid(_))
        ));
        assert!(matches!(
            SearchGrid::new(vec![1.0], vec![-2.0]),
            Err(ClassifierError::InvalidGrid(_))
        ));
        assert!(matches!(
            SearchGrid::new(vec![f64::NAN], vec![1.0]),
            Err(ClassifierError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_no_test_documents() {
        let mut trainer = trained();
        trainer.define_categories(&["spam", "ham"]).unwrap();
        trainer.add_training_doc("spam", &["buy", "buy"]).unwrap();
        trainer.create(0.0, 0.0);
        let before = trainer.classifier().clone();

        let err = trainer.test(false).unwrap_err();
        assert!(matches!(err, ClassifierError::NoTestDocuments));
        assert_eq!(trainer.classifier(), &before);
        assert_eq!(trainer.thresholds(), Some(Thresholds::new(0.0, 0.0)));
        assert!(matches!(trainer.evaluate(), Err(ClassifierError::NoTestDocuments)));
    }

    #[test]
    fn test_evaluate_current_lookup() {
        let mut trainer = trained();
        trainer.create(0.0, 0.0);
        let eval = trainer.evaluate().unwrap();
        assert_eq!(eval.total, 2);
        assert_eq!(eval.correct, 2);
        assert_eq!(eval.accuracy, 1.0);
    }

    #[test]
    fn test_ties_keep_first_combination() {
        // Allowances far above any weight leave the lookup empty, so every
        // document goes to category 0 and every combination scores 0.5
        let mut trainer = trained();
        let grid = SearchGrid::new(vec![1e9, 2e9], vec![0.0, 10.0]).unwrap();
        let outcome = trainer.test_with_grid(&grid, false, |_| {}).unwrap();

        assert_eq!(outcome.combinations, 4);
        assert_eq!(outcome.accuracy(), 0.5);
        assert_eq!(outcome.thresholds(), Thresholds::new(1e9, 0.0));
    }

    #[test]
    fn test_best_found_and_lookup_left_at_last_combination() {
        let mut trainer = trained();
        let grid = SearchGrid::new(vec![1e9, 0.0, 1e12], vec![0.0]).unwrap();

        let mut seen = Vec::new();
        let outcome = trainer
            .test_with_grid(&grid, true, |p| seen.push(p.allowance))
            .unwrap();

        assert_eq!(seen, vec![1e9, 0.0, 1e12]);
        assert_eq!(outcome.allowance(), 0.0);
        assert_eq!(outcome.maxscore(), 0.0);
        assert_eq!(outcome.best.evaluation.correct, 2);

        assert_eq!(trainer.thresholds(), Some(Thresholds::new(1e12, 0.0)));
        assert_eq!(trainer.classifier().vocabulary_size(), 0);

        trainer.create(outcome.allowance(), outcome.maxscore());
        assert_eq!(trainer.evaluate().unwrap().accuracy, 1.0);
    }

    #[test]
    fn test_default_search_runs_every_combination() {
        let mut trainer = trained();
        let mut calls = 0;
        let outcome = trainer
            .test_with_grid(&SearchGrid::default(), false, |_| calls += 1)
            .unwrap();
        assert_eq!(calls, 2346);
        assert_eq!(outcome.combinations, 2346);
        assert_eq!(outcome.accuracy(), 1.0);

        let again = trainer.test(false).unwrap();
        assert_eq!(again, outcome);
    }
}
