//! Model file format
//!
//! Only inference state is stored: category names and the token lookup.
//!
//! ```text
//! offset  size  content
//! 0       4     magic "BAGC"
//! 4       1     format version
//! 5       ..    zstd stream of a JSON record { categories, lookup }
//! ```
//!
//! The layout is only guaranteed stable within one format version.

use super::model::Classifier;
use super::{ClassifierError, ClassifierResult};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

const MAGIC: &[u8; 4] = b"BAGC";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1;
const ZSTD_LEVEL: i32 = 3;

/// Write a classifier to `path`
pub fn save(classifier: &Classifier, path: &Path) -> ClassifierResult<()> {
    let bytes = encode(classifier)?;
    std::fs::write(path, bytes)?;
    tracing::debug!(
        "Saved model to {} ({} categories, {} tokens)",
        path.display(),
        classifier.categories().len(),
        classifier.vocabulary_size()
    );
    Ok(())
}

/// Read a classifier previously written by [`save`]
pub fn load(path: &Path) -> ClassifierResult<Classifier> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Serialize to the on-disk representation
pub fn encode(classifier: &Classifier) -> ClassifierResult<Vec<u8>> {
    let json = serde_json::to_vec(classifier).map_err(std::io::Error::from)?;
    let compressed = zstd::encode_all(Cursor::new(json), ZSTD_LEVEL)?;

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Parse and validate the on-disk representation
pub fn decode(bytes: &[u8]) -> ClassifierResult<Classifier> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ClassifierError::Decode("not a bagclass model file".into()));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(ClassifierError::Decode(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let json = zstd::decode_all(Cursor::new(&bytes[HEADER_LEN..]))
        .map_err(|e| ClassifierError::Decode(format!("corrupt compressed payload: {e}")))?;
    let classifier: Classifier = serde_json::from_slice(&json)
        .map_err(|e| ClassifierError::Decode(format!("invalid model record: {e}")))?;

    validate(&classifier)?;
    Ok(classifier)
}

/// Reject records that could not have come from a trained classifier
fn validate(classifier: &Classifier) -> ClassifierResult<()> {
    let categories = classifier.categories();
    if categories.is_empty() {
        return Err(ClassifierError::Decode("model has no categories".into()));
    }

    let mut names = HashSet::with_capacity(categories.len());
    for name in categories {
        if !names.insert(name.as_str()) {
            return Err(ClassifierError::Decode(format!(
                "category '{name}' listed twice"
            )));
        }
    }

    for (token, scorers) in classifier.lookup() {
        let mut seen = HashSet::with_capacity(scorers.len());
        for scorer in scorers {
            if scorer.category >= categories.len() {
                return Err(ClassifierError::Decode(format!(
                    "token '{token}' refers to category {} of {}",
                    scorer.category,
                    categories.len()
                )));
            }
            if !seen.insert(scorer.category) {
                return Err(ClassifierError::Decode(format!(
                    "token '{token}' has two scores for category {}",
                    scorer.category
                )));
            }
            if !scorer.score.is_finite() {
                return Err(ClassifierError::Decode(format!(
                    "token '{token}' has a non-finite score"
                )));
            }
        }
    }

    Ok(())
}

impl Classifier {
    /// Load a classifier saved with [`Classifier::save`] or [`Trainer::save`](super::Trainer::save)
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        load(path)
    }

    pub fn save(&self, path: &Path) -> ClassifierResult<()> {
        save(self, path)
    }
}
