//! Info command - describe a saved model

use anyhow::{Context, Result};
use bagclass::classifier::Classifier;
use console::style;
use std::path::Path;

/// Run the info command
pub fn run(model: &Path) -> Result<()> {
    let classifier = Classifier::load(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;

    println!("\n{} {}\n", style("Model").bold(), style(model.display()).cyan());
    println!("  {} {}", style("vocabulary:").bold(), classifier.vocabulary_size());
    println!("  {} {}", style("categories:").bold(), classifier.categories().len());
    for (index, name) in classifier.categories().iter().enumerate() {
        println!("    {} {}", style(format!("{index:>3}")).dim(), name);
    }
    Ok(())
}
