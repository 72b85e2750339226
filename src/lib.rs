//! bagclass - bagging text classifier
//!
//! Learns per-category token weights from labeled, pre-tokenized documents
//! using 20 bootstrap replicates per category, then predicts the category of
//! new token sequences. Thresholds can be tuned by grid search against
//! held-out documents, and trained models saved to compact files.
//!
//! - [`classifier`]: training, inference, threshold search and model files
//! - [`config`]: TOML/env settings for seeds, thresholds and search grids

pub mod classifier;
pub mod config;
