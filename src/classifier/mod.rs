//! Bagging text classifier
//!
//! Learns discriminative token weights from labeled, pre-tokenized documents
//! and scores token sequences against them.
//!
//! Architecture: training tokens → 20 bootstrap replicates per category →
//! pruned weight sets → thresholded tally → log-score lookup
//!
//! Two thresholds shape the final lookup. `allowance` drops weak per-replicate
//! weights, `maxscore` caps strong ones. Both can be tuned against held-out
//! documents with [`Trainer::test`].
//!
//! # Example
//!
//! ```rust
//! use bagclass::classifier::Trainer;
//!
//! let mut trainer = Trainer::with_seed(7);
//! trainer.define_categories(&["spam", "ham"]).unwrap();
//! trainer.add_training_doc("spam", &["buy", "buy", "buy", "buy", "cheap", "cheap"]).unwrap();
//! trainer.add_training_doc("ham", &["hello", "hello", "hello", "meeting"]).unwrap();
//! trainer.create(0.0, 0.0);
//!
//! let scores = trainer.classify(&["buy", "cheap"]);
//! assert!(scores[0] > scores[1]);
//! ```

mod aggregate;
pub mod categories;
pub mod corpus;
mod ensemble;
pub mod model;
pub mod persist;
pub mod search;
pub mod trainer;

pub use aggregate::Thresholds;
pub use categories::{CategoryRegistry, ENSEMBLE_SIZE};
pub use corpus::{TestDoc, TrainingCorpus};
pub use model::{Classifier, Prediction, Scorer};
pub use search::{GridPoint, SearchGrid, SearchOutcome};
pub use trainer::Trainer;

use thiserror::Error;

/// Errors that can occur while training, searching or persisting a classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Category '{0}' not defined")]
    UnknownCategory(String),

    #[error("Category '{0}' defined more than once")]
    DuplicateCategory(String),

    #[error("At least one category is required")]
    NoCategories,

    #[error("No test documents added; add some with add_test_doc before searching")]
    NoTestDocuments,

    #[error("Invalid search grid: {0}")]
    InvalidGrid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model: {0}")]
    Decode(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;
