//! Turns pruned ensemble weights into the classifier lookup

use super::categories::CategoryRegistry;
use super::ensemble::Ensemble;
use super::model::Scorer;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The two tunable knobs of lookup construction.
///
/// Zero disables either filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum per-replicate weight that counts towards a tally
    pub allowance: f64,
    /// Cap applied to each per-replicate weight before tallying
    pub maxscore: f64,
}

impl Thresholds {
    pub fn new(allowance: f64, maxscore: f64) -> Self {
        Self {
            allowance,
            maxscore,
        }
    }

    /// Contribution of one replicate weight, or `None` if filtered out
    fn contribution(&self, weight: f64) -> Option<f64> {
        if weight < self.allowance {
            return None;
        }
        if self.maxscore > 0.0 && weight > self.maxscore {
            Some(self.maxscore)
        } else {
            Some(weight)
        }
    }
}

/// Sum of filtered and capped weights per token over a category's replicates
pub(crate) fn category_tally<'a>(
    registry: &'a CategoryRegistry,
    ensemble: &'a Ensemble,
    category: usize,
    thresholds: Thresholds,
) -> FxHashMap<&'a str, f64> {
    let mut tally: FxHashMap<&str, f64> = FxHashMap::default();
    for slot in ensemble.category_slots(registry, category) {
        for wt in slot {
            if let Some(score) = thresholds.contribution(wt.weight) {
                *tally.entry(wt.token.as_str()).or_insert(0.0) += score;
            }
        }
    }
    tally
}

/// Build token -> scorers, one scorer per category with a positive tally.
///
/// Categories are visited in index order, so every scorer list is sorted by
/// category.
pub(crate) fn build_lookup(
    registry: &CategoryRegistry,
    ensemble: &Ensemble,
    thresholds: Thresholds,
) -> HashMap<String, Vec<Scorer>> {
    let mut lookup: HashMap<String, Vec<Scorer>> = HashMap::new();

    for category in 0..registry.len() {
        for (tok, tally) in category_tally(registry, ensemble, category, thresholds) {
            if tally > 0.0 {
                lookup.entry(tok.to_string()).or_default().push(Scorer {
                    category,
                    score: tally.ln() as f32,
                });
            }
        }
    }

    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::corpus::TrainingCorpus;
    use crate::classifier::ENSEMBLE_SIZE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (CategoryRegistry, Ensemble) {
        let registry = CategoryRegistry::new(&["a", "b", "c"]).unwrap();
        let mut corpus = TrainingCorpus::new(3);
        corpus.add_training(0, &["x", "x", "x", "y", "y", "z", "w", "x", "y", "v", "v"]);
        corpus.add_training(1, &["y", "y", "y", "z", "z", "q", "q", "q", "x"]);
        corpus.add_training(2, &["p", "p", "p", "p", "q", "z", "z", "w", "w", "w"]);
        let ensemble = Ensemble::build(&registry, &corpus, &mut ChaCha8Rng::seed_from_u64(11));
        (registry, ensemble)
    }

    fn total_tally(registry: &CategoryRegistry, ensemble: &Ensemble, c: usize, t: Thresholds) -> f64 {
        category_tally(registry, ensemble, c, t).values().sum()
    }

    #[test]
    fn test_contribution_rules() {
        let t = Thresholds::new(1.5, 3.0);
        assert_eq!(t.contribution(1.2), None);
        assert_eq!(t.contribution(1.5), Some(1.5));
        assert_eq!(t.contribution(2.0), Some(2.0));
        assert_eq!(t.contribution(9.0), Some(3.0));

        let open = Thresholds::default();
        assert_eq!(open.contribution(1000.0), Some(1000.0));
    }

    #[test]
    fn test_known_tally_is_log_of_sum() {
        // Every replicate gives "p" weight 2.0 in "a", 20 replicates -> tally 40
        let registry = CategoryRegistry::new(&["a", "b"]).unwrap();
        let mut corpus = TrainingCorpus::new(2);
        corpus.add_training(0, &["p", "p", "p", "p"]);
        corpus.add_training(1, &["q", "q", "q", "q"]);
        let ensemble = Ensemble::build(&registry, &corpus, &mut ChaCha8Rng::seed_from_u64(1));

        let lookup = build_lookup(&registry, &ensemble, Thresholds::default());
        let p = &lookup["p"];
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].category, 0);
        assert!((p[0].score - (2.0f64 * ENSEMBLE_SIZE as f64).ln() as f32).abs() < 1e-6);

        // Capping at 1.5 -> 20 * 1.5 = 30
        let capped = build_lookup(&registry, &ensemble, Thresholds::new(0.0, 1.5));
        assert!((capped["p"][0].score - 30.0f32.ln()).abs() < 1e-6);

        // Allowance above every weight removes everything
        let empty = build_lookup(&registry, &ensemble, Thresholds::new(2.5, 0.0));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_raising_allowance_never_increases_tally() {
        let (registry, ensemble) = fixture();
        let allowances = [0.0, 1.05, 1.2, 1.5, 2.0, 3.0, 5.0, 10.0];
        for c in 0..registry.len() {
            let mut prev = f64::INFINITY;
            for &a in &allowances {
                let total = total_tally(&registry, &ensemble, c, Thresholds::new(a, 0.0));
                assert!(total <= prev, "category {c} allowance {a}: {total} > {prev}");
                prev = total;
            }
        }
    }

    #[test]
    fn test_no_contribution_exceeds_maxscore() {
        let (registry, ensemble) = fixture();
        let t = Thresholds::new(0.0, 1.3);
        for slot in 0..ensemble.slot_count() {
            for wt in ensemble.slot(slot) {
                if let Some(c) = t.contribution(wt.weight) {
                    assert!(c <= 1.3);
                }
            }
        }
        // Each token's tally is bounded by replicates * cap
        for c in 0..registry.len() {
            for (_, tally) in category_tally(&registry, &ensemble, c, t) {
                assert!(tally <= 1.3 * ENSEMBLE_SIZE as f64 + 1e-9);
            }
        }
    }

    #[test]
    fn test_lookup_sorted_by_category_and_unique() {
        let (registry, ensemble) = fixture();
        let lookup = build_lookup(&registry, &ensemble, Thresholds::default());
        assert!(!lookup.is_empty());
        for scorers in lookup.values() {
            assert!(scorers.windows(2).all(|w| w[0].category < w[1].category));
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let (registry, ensemble) = fixture();
        let t = Thresholds::new(1.1, 4.0);
        assert_eq!(
            build_lookup(&registry, &ensemble, t),
            build_lookup(&registry, &ensemble, t)
        );
    }
}
