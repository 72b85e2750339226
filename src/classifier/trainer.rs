//! Training front end
//!
//! A [`Trainer`] owns a [`Classifier`] plus everything needed to rebuild it:
//! the category registry, the training corpus, the cached ensemble and the
//! random source used for subsampling.

use super::aggregate::{build_lookup, Thresholds};
use super::categories::CategoryRegistry;
use super::corpus::TrainingCorpus;
use super::ensemble::Ensemble;
use super::model::{Classifier, Prediction};
use super::{persist, ClassifierResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::path::Path;

/// Seed used by [`Trainer::new`], so the same data always gives the same model
pub const DEFAULT_SEED: u64 = 0x5eed_ba99;

/// Builds and tunes a [`Classifier`] from labeled token sequences
#[derive(Debug, Clone)]
pub struct Trainer<R = ChaCha8Rng> {
    pub(super) classifier: Classifier,
    pub(super) registry: CategoryRegistry,
    pub(super) corpus: TrainingCorpus,
    /// `None` when training data changed since the last build
    pub(super) ensemble: Option<Ensemble>,
    /// Thresholds of the last `create`
    pub(super) thresholds: Option<Thresholds>,
    rng: R,
}

impl Trainer<ChaCha8Rng> {
    /// Trainer seeded with [`DEFAULT_SEED`]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Trainer with a specific sampling seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for Trainer<ChaCha8Rng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Trainer<R> {
    /// Trainer drawing its subsamples from `rng`
    pub fn with_rng(rng: R) -> Self {
        Self {
            classifier: Classifier::default(),
            registry: CategoryRegistry::default(),
            corpus: TrainingCorpus::default(),
            ensemble: None,
            thresholds: None,
            rng,
        }
    }

    /// Register the category set, discarding all training data and models.
    ///
    /// On error the previous state is left untouched.
    pub fn define_categories<S: AsRef<str>>(&mut self, names: &[S]) -> ClassifierResult<()> {
        let registry = CategoryRegistry::new(names)?;

        self.corpus = TrainingCorpus::new(registry.len());
        self.classifier = Classifier::new(registry.names().to_vec());
        self.registry = registry;
        self.ensemble = None;
        self.thresholds = None;

        tracing::info!("Defined {} categories", self.registry.len());
        Ok(())
    }

    /// Append a training document's tokens to a category
    pub fn add_training_doc<S: AsRef<str>>(
        &mut self,
        category: &str,
        tokens: &[S],
    ) -> ClassifierResult<()> {
        let index = self.registry.resolve(category)?;
        self.corpus.add_training(index, tokens);
        self.ensemble = None;
        Ok(())
    }

    /// Store a held-out document for [`test`](Self::test) and [`evaluate`](Self::evaluate)
    pub fn add_test_doc<S: AsRef<str>>(
        &mut self,
        category: &str,
        tokens: &[S],
    ) -> ClassifierResult<()> {
        let index = self.registry.resolve(category)?;
        self.corpus.add_test(index, tokens);
        Ok(())
    }

    /// Build the lookup. Zero for either threshold means no limit.
    ///
    /// The ensemble is sampled on the first call after training data changes
    /// and reused afterwards, so repeated calls only redo the aggregation.
    pub fn create(&mut self, allowance: f64, maxscore: f64) {
        let thresholds = Thresholds::new(allowance, maxscore);

        if self.ensemble.is_none() {
            tracing::debug!("Training data changed, resampling ensemble");
        }
        let ensemble = self
            .ensemble
            .get_or_insert_with(|| Ensemble::build(&self.registry, &self.corpus, &mut self.rng));

        self.classifier.lookup = build_lookup(&self.registry, ensemble, thresholds);
        self.thresholds = Some(thresholds);

        tracing::debug!(
            "Built lookup (allowance {}, maxscore {}): {} tokens",
            allowance,
            maxscore,
            self.classifier.vocabulary_size()
        );
    }

    /// Score tokens against every category
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f64> {
        self.classifier.classify(tokens)
    }

    /// Best category for tokens
    pub fn classify_simple<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Prediction<'_>> {
        self.classifier.classify_simple(tokens)
    }

    /// Save the current classifier (categories + lookup)
    pub fn save(&self, path: &Path) -> ClassifierResult<()> {
        persist::save(&self.classifier, path)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn into_classifier(self) -> Classifier {
        self.classifier
    }

    pub fn categories(&self) -> &[String] {
        self.registry.names()
    }

    /// Category name -> index
    pub fn category_index(&self) -> &HashMap<String, usize> {
        self.registry.category_index()
    }

    /// Thresholds of the last [`create`](Self::create), if any
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    /// Number of training tokens stored for a category
    pub fn training_token_count(&self, category: &str) -> ClassifierResult<usize> {
        let index = self.registry.resolve(category)?;
        Ok(self.corpus.tokens(index).len())
    }

    pub fn test_doc_count(&self) -> usize {
        self.corpus.test_docs().len()
    }
}
