//! Classify command - score token sequences with a saved model

use anyhow::{Context, Result};
use bagclass::classifier::Classifier;
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Output<'a> {
    category: &'a str,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<Vec<CategoryScore<'a>>>,
}

#[derive(Debug, Serialize)]
struct CategoryScore<'a> {
    category: &'a str,
    score: f64,
}

/// Run the classify command
pub fn run(model: &Path, tokens: &[String], scores: bool, format: &str) -> Result<()> {
    let classifier = Classifier::load(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;

    if !tokens.is_empty() {
        println!("{}", render(&classifier, tokens, scores, format)?);
        return Ok(());
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let doc: Vec<&str> = line.split_whitespace().collect();
        println!("{}", render(&classifier, &doc, scores, format)?);
    }
    Ok(())
}

fn render<S: AsRef<str>>(
    classifier: &Classifier,
    tokens: &[S],
    scores: bool,
    format: &str,
) -> Result<String> {
    let prediction = classifier
        .classify_simple(tokens)
        .context("Model has no categories")?;

    let all = scores.then(|| {
        classifier
            .categories()
            .iter()
            .zip(classifier.classify(tokens))
            .map(|(category, score)| CategoryScore {
                category: category.as_str(),
                score,
            })
            .collect::<Vec<_>>()
    });

    if format == "json" {
        let output = Output {
            category: prediction.category,
            score: prediction.score,
            scores: all,
        };
        return Ok(serde_json::to_string(&output)?);
    }

    let mut text = format!("{}\t{:.4}", prediction.category, prediction.score);
    for s in all.iter().flatten() {
        text.push_str(&format!("\n  {}\t{:.4}", s.category, s.score));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_model_picks_first_category() {
        let classifier = Classifier::new(vec!["a".into(), "b".into()]);
        let text = render(&classifier, &["x"], false, "text").unwrap();
        assert_eq!(text, "a\t0.0000");
    }

    #[test]
    fn test_render_json_with_scores() {
        let classifier = Classifier::new(vec!["a".into(), "b".into()]);
        let json = render(&classifier, &["x"], true, "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["category"], "a");
        assert_eq!(value["scores"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_without_categories_fails() {
        let classifier = Classifier::new(Vec::new());
        assert!(render(&classifier, &["x"], false, "text").is_err());
    }
}
