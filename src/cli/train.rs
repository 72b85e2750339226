//! Train command - build a model from a JSONL dataset

use super::dataset::{Dataset, Split};
use super::search::run_search;
use anyhow::{Context, Result};
use bagclass::classifier::{Thresholds, Trainer};
use bagclass::config::Settings;
use console::style;
use std::path::Path;
use std::time::Instant;

pub struct TrainArgs<'a> {
    pub data: &'a Path,
    pub output: &'a Path,
    pub allowance: Option<f64>,
    pub maxscore: Option<f64>,
    pub search: bool,
    pub verbose: bool,
    pub seed: Option<u64>,
    pub categories: Option<Vec<String>>,
}

/// Run the train command
pub fn run(settings: &Settings, args: TrainArgs<'_>) -> Result<()> {
    let start = Instant::now();
    let dataset = Dataset::load(args.data)?;
    if dataset.count(Split::Train) == 0 {
        anyhow::bail!("{} has no training documents", args.data.display());
    }

    let seed = args.seed.unwrap_or_else(|| settings.seed());
    let mut trainer = Trainer::with_seed(seed);
    dataset.populate(&mut trainer, args.categories)?;

    let thresholds = if args.search {
        if trainer.test_doc_count() == 0 {
            anyhow::bail!(
                "--search needs test documents; add records with \"split\": \"test\" to {}",
                args.data.display()
            );
        }
        let grid = settings.search_grid().context("Invalid search grid in config")?;
        let outcome = run_search(&mut trainer, &grid, args.verbose || settings.verbose(), true)?;
        println!(
            "{} Search picked allowance {} and maxscore {} ({:.2}% on {} test documents)",
            style("✓").green(),
            outcome.allowance(),
            outcome.maxscore(),
            outcome.accuracy() * 100.0,
            outcome.best.evaluation.total
        );
        outcome.thresholds()
    } else {
        let configured = settings.thresholds();
        Thresholds::new(
            args.allowance.unwrap_or(configured.allowance),
            args.maxscore.unwrap_or(configured.maxscore),
        )
    };

    trainer.create(thresholds.allowance, thresholds.maxscore);
    trainer
        .save(args.output)
        .with_context(|| format!("Failed to write model to {}", args.output.display()))?;

    let classifier = trainer.classifier();
    println!(
        "{} Trained {} categories ({} tokens) in {:.2}s",
        style("✓").green(),
        classifier.categories().len(),
        classifier.vocabulary_size(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "  {} allowance {}, maxscore {}, seed {}",
        style("thresholds:").dim(),
        thresholds.allowance,
        thresholds.maxscore,
        seed
    );
    println!("  {} {}", style("model:").dim(), style(args.output.display()).cyan());
    Ok(())
}
