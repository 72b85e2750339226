//! JSONL dataset loading
//!
//! One labeled document per line:
//! `{"category": "spam", "tokens": ["buy", "now"], "split": "test"}`

use anyhow::{Context, Result};
use bagclass::classifier::Trainer;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Test,
}

/// A labeled, pre-tokenized document
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub category: String,
    pub tokens: Vec<String>,
    #[serde(default)]
    pub split: Split,
}

#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Load a JSONL file, skipping blank lines
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid dataset {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(line)
                .with_context(|| format!("line {}: not a dataset record", lineno + 1))?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Category names in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.category.as_str()))
            .map(|r| r.category.clone())
            .collect()
    }

    pub fn count(&self, split: Split) -> usize {
        self.records.iter().filter(|r| r.split == split).count()
    }

    /// Register categories and feed every record into `trainer`.
    ///
    /// `categories` overrides the dataset's own category order; records with a
    /// category outside it are an error.
    pub fn populate<R: Rng>(
        &self,
        trainer: &mut Trainer<R>,
        categories: Option<Vec<String>>,
    ) -> Result<()> {
        let categories = categories.unwrap_or_else(|| self.categories());
        trainer
            .define_categories(&categories)
            .context("Failed to register categories")?;

        for record in &self.records {
            let added = match record.split {
                Split::Train => trainer.add_training_doc(&record.category, &record.tokens),
                Split::Test => trainer.add_test_doc(&record.category, &record.tokens),
            };
            added.context("Dataset record does not match the category list")?;
        }

        tracing::info!(
            "Loaded {} training and {} test documents across {} categories",
            self.count(Split::Train),
            self.count(Split::Test),
            categories.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
{"category": "spam", "tokens": ["buy", "now"]}
{"category": "ham", "tokens": ["hello"], "split": "train"}

{"category": "spam", "tokens": ["cheap"], "split": "test"}
"#;

    #[test]
    fn test_parse_and_counts() {
        let ds = Dataset::parse(SAMPLE).unwrap();
        assert_eq!(ds.categories(), vec!["spam", "ham"]);
        assert_eq!(ds.count(Split::Train), 2);
        assert_eq!(ds.count(Split::Test), 1);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = Dataset::parse("{\"category\": \"a\", \"tokens\": []}\n{oops}\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_unknown_split_rejected() {
        assert!(Dataset::parse(r#"{"category": "a", "tokens": [], "split": "dev"}"#).is_err());
    }

    #[test]
    fn test_populate() {
        let ds = Dataset::parse(SAMPLE).unwrap();
        let mut trainer = Trainer::new();
        ds.populate(&mut trainer, None).unwrap();
        assert_eq!(trainer.categories(), &["spam", "ham"]);
        assert_eq!(trainer.training_token_count("spam").unwrap(), 2);
        assert_eq!(trainer.test_doc_count(), 1);
    }

    #[test]
    fn test_populate_with_explicit_categories() {
        let ds = Dataset::parse(SAMPLE).unwrap();
        let mut trainer = Trainer::new();
        ds.populate(&mut trainer, Some(vec!["ham".into(), "spam".into(), "other".into()]))
            .unwrap();
        assert_eq!(trainer.category_index()["spam"], 1);

        let mut trainer = Trainer::new();
        assert!(ds.populate(&mut trainer, Some(vec!["spam".into()])).is_err());
    }
}
