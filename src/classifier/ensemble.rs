//! Bootstrap ensemble construction
//!
//! Every category's training tokens are subsampled `ENSEMBLE_SIZE` times at
//! 50%. Each replicate keeps only the tokens that are over-represented in it
//! compared to their frequency across all replicates of all categories.
//!
//! Pruning rules for a token in one replicate:
//! - seen once in the replicate -> dropped (noise)
//! - replicate ratio <= global baseline -> dropped (no information)
//! - otherwise kept with weight = replicate ratio / global baseline (> 1)

use super::categories::{CategoryRegistry, ENSEMBLE_SIZE};
use super::corpus::TrainingCorpus;
use rand::Rng;
use rustc_hash::FxHashMap;

/// A token retained in one replicate, with its over-representation weight
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeightedToken {
    pub token: String,
    pub weight: f64,
}

/// Pruned weight sets for every ensemble slot, indexed by global slot index
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Ensemble {
    slots: Vec<Vec<WeightedToken>>,
}

impl Ensemble {
    /// Sample and prune all replicates for all categories.
    pub fn build<R: Rng + ?Sized>(
        registry: &CategoryRegistry,
        corpus: &TrainingCorpus,
        rng: &mut R,
    ) -> Self {
        let slot_count = registry.slot_count();
        let mut slot_sizes = vec![0usize; slot_count];
        let mut slot_counts: Vec<FxHashMap<&str, u32>> = vec![FxHashMap::default(); slot_count];
        let mut global_counts: FxHashMap<&str, u64> = FxHashMap::default();
        let mut total: u64 = 0;

        for category in 0..registry.len() {
            let tokens = corpus.tokens(category);
            let per_slot = tokens.len().div_ceil(2);

            for &slot in registry.slots(category) {
                slot_sizes[slot] = per_slot;
                total += per_slot as u64;

                let counts = &mut slot_counts[slot];
                for i in sample_indices(rng, tokens.len(), per_slot) {
                    let token = tokens[i].as_str();
                    *counts.entry(token).or_insert(0) += 1;
                    *global_counts.entry(token).or_insert(0) += 1;
                }
            }
        }

        let baseline: FxHashMap<&str, f64> = global_counts
            .iter()
            .map(|(&tok, &count)| (tok, count as f64 / total as f64))
            .collect();

        let mut slots = Vec::with_capacity(slot_count);
        let mut retained = 0usize;
        for (slot, counts) in slot_counts.iter().enumerate() {
            let size = slot_sizes[slot] as f64;
            let mut kept: Vec<WeightedToken> = counts
                .iter()
                .filter(|(_, &count)| count > 1)
                .filter_map(|(&tok, &count)| {
                    let local = count as f64 / size;
                    let base = baseline[tok];
                    (local > base).then(|| WeightedToken {
                        token: tok.to_string(),
                        weight: local / base,
                    })
                })
                .collect();
            kept.sort_by(|a, b| a.token.cmp(&b.token));
            retained += kept.len();
            slots.push(kept);
        }

        tracing::debug!(
            "Ensemble built: {} slots, {} sampled tokens, {} distinct, {} retained weights",
            slot_count,
            total,
            global_counts.len(),
            retained
        );

        Self { slots }
    }

    /// Retained tokens of one slot
    pub fn slot(&self, slot: usize) -> &[WeightedToken] {
        &self.slots[slot]
    }

    /// Retained tokens of every replicate of a category
    pub fn category_slots<'a>(
        &'a self,
        registry: &'a CategoryRegistry,
        category: usize,
    ) -> impl Iterator<Item = &'a [WeightedToken]> + 'a {
        registry
            .slots(category)
            .iter()
            .map(move |&slot| self.slot(slot))
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// Draw `wanted` distinct indices from `0..num` by rejection sampling.
///
/// Requires `wanted <= num`.
pub(crate) fn sample_indices<R: Rng + ?Sized>(rng: &mut R, num: usize, wanted: usize) -> Vec<usize> {
    debug_assert!(wanted <= num);
    let mut output = Vec::with_capacity(wanted);
    let mut used = vec![false; num];

    while output.len() < wanted {
        let n = rng.random_range(0..num);
        if !used[n] {
            used[n] = true;
            output.push(n);
        }
    }

    output
}
