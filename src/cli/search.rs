//! Search command - tune thresholds on a dataset's test split

use super::dataset::{Dataset, Split};
use anyhow::{Context, Result};
use bagclass::classifier::{SearchGrid, SearchOutcome, Trainer};
use bagclass::config::Settings;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::path::Path;

/// Run the search command
pub fn run(
    settings: &Settings,
    data: &Path,
    format: &str,
    verbose: bool,
    seed: Option<u64>,
    categories: Option<Vec<String>>,
) -> Result<()> {
    let dataset = Dataset::load(data)?;
    if dataset.count(Split::Test) == 0 {
        anyhow::bail!(
            "{} has no test documents; add records with \"split\": \"test\"",
            data.display()
        );
    }

    let mut trainer = Trainer::with_seed(seed.unwrap_or_else(|| settings.seed()));
    dataset.populate(&mut trainer, categories)?;

    let grid = settings.search_grid().context("Invalid search grid in config")?;
    let outcome = run_search(&mut trainer, &grid, verbose || settings.verbose(), format == "text")?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

/// Grid-search with a progress bar (or per-combination lines when verbose)
pub(super) fn run_search<R: Rng>(
    trainer: &mut Trainer<R>,
    grid: &SearchGrid,
    verbose: bool,
    show_progress: bool,
) -> Result<SearchOutcome> {
    let bar = if show_progress && !verbose {
        let bar = ProgressBar::new(grid.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        bar.set_message("Searching thresholds...");
        bar
    } else {
        ProgressBar::hidden()
    };

    let outcome = trainer.test_with_grid(grid, verbose, |point| {
        if verbose {
            eprintln!(
                "allowance {}, maxscore {} = {:.6} ({} correct)",
                point.allowance, point.maxscore, point.evaluation.accuracy, point.evaluation.correct
            );
        }
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    Ok(outcome)
}

fn print_outcome(outcome: &SearchOutcome) {
    println!(
        "\n{} Best of {} combinations",
        style("✓").green(),
        outcome.combinations
    );
    println!("  {} {}", style("allowance:").bold(), outcome.allowance());
    println!("  {} {}", style("maxscore: ").bold(), outcome.maxscore());
    println!(
        "  {} {:.2}% ({}/{})",
        style("accuracy: ").bold(),
        outcome.accuracy() * 100.0,
        outcome.best.evaluation.correct,
        outcome.best.evaluation.total
    );
}
