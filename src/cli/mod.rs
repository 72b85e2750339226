//! CLI command definitions and handlers

mod classify;
mod dataset;
mod info;
mod init;
mod search;
mod train;

use anyhow::Result;
use bagclass::config::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a threshold value (finite, >= 0)
fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !v.is_finite() || v < 0.0 {
        Err("thresholds must be finite and >= 0 (0 = no limit)".to_string())
    } else {
        Ok(v)
    }
}

/// bagclass - Bagging text classifier
///
/// Tokenization is up to you: datasets and inputs are pre-tokenized.
#[derive(Parser, Debug)]
#[command(name = "bagclass")]
#[command(
    version,
    about = "Bagging text classifier - learn token weights from labeled documents and predict categories",
    long_about = "bagclass learns discriminative token weights per category from 20 bootstrap \
replicates of the training tokens, then scores token sequences against them.\n\n\
Datasets are JSONL, one document per line:\n  \
{\"category\": \"spam\", \"tokens\": [\"buy\", \"now\"], \"split\": \"train\"}\n\n\
`split` is \"train\" (default) or \"test\"; test documents drive threshold search.",
    after_help = "\
Examples:
  bagclass train data.jsonl -o model.bagc             Train with default thresholds
  bagclass train data.jsonl -o model.bagc --search    Tune thresholds first
  bagclass search data.jsonl --format json            Only report the best thresholds
  bagclass classify model.bagc buy cheap now          Classify one token sequence
  cat docs.txt | bagclass classify model.bagc         One document per line
  bagclass info model.bagc                            Show categories and vocabulary"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Directory holding bagclass.toml (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a bagclass.toml with example settings
    Init,

    /// Train a model from a JSONL dataset and save it
    #[command(after_help = "\
Examples:
  bagclass train data.jsonl -o model.bagc
  bagclass train data.jsonl -o model.bagc --allowance 1.5 --maxscore 400
  bagclass train data.jsonl -o model.bagc --search --verbose
  bagclass train data.jsonl -o model.bagc --categories spam,ham")]
    Train {
        /// JSONL dataset
        data: PathBuf,

        /// Where to write the model
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Minimum per-replicate token weight (0 = no minimum)
        #[arg(long, value_parser = parse_threshold)]
        allowance: Option<f64>,

        /// Cap on each per-replicate token weight (0 = no cap)
        #[arg(long, value_parser = parse_threshold)]
        maxscore: Option<f64>,

        /// Pick thresholds by grid search on the dataset's test split
        #[arg(long, conflicts_with_all = ["allowance", "maxscore"])]
        search: bool,

        /// Report every search combination
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Sampling seed
        #[arg(long, env = "BAGCLASS_SEED")]
        seed: Option<u64>,

        /// Category order (default: first-seen order in the dataset)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
    },

    /// Grid-search thresholds against the dataset's test split
    Search {
        /// JSONL dataset
        data: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Report every combination
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Sampling seed
        #[arg(long, env = "BAGCLASS_SEED")]
        seed: Option<u64>,

        /// Category order (default: first-seen order in the dataset)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
    },

    /// Classify tokens with a saved model
    ///
    /// Without TOKENS, reads stdin and classifies each line as one
    /// whitespace-separated document.
    Classify {
        /// Model file written by `bagclass train`
        model: PathBuf,

        /// Tokens of one document
        tokens: Vec<String>,

        /// Print every category's score
        #[arg(long)]
        scores: bool,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show a saved model's categories and vocabulary size
    Info {
        /// Model file written by `bagclass train`
        model: PathBuf,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.config_dir),

        Commands::Train {
            data,
            output,
            allowance,
            maxscore,
            search,
            verbose,
            seed,
            categories,
        } => {
            let settings = Settings::load(&cli.config_dir)?;
            train::run(
                &settings,
                train::TrainArgs {
                    data: &data,
                    output: &output,
                    allowance,
                    maxscore,
                    search,
                    verbose,
                    seed,
                    categories,
                },
            )
        }

        Commands::Search {
            data,
            format,
            verbose,
            seed,
            categories,
        } => {
            let settings = Settings::load(&cli.config_dir)?;
            search::run(&settings, &data, &format, verbose, seed, categories)
        }

        Commands::Classify {
            model,
            tokens,
            scores,
            format,
        } => classify::run(&model, &tokens, scores, &format),

        Commands::Info { model } => info::run(&model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("1.5"), Ok(1.5));
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert!(parse_threshold("-1").is_err());
        assert!(parse_threshold("inf").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_search_conflicts_with_explicit_thresholds() {
        let res = Cli::try_parse_from([
            "bagclass", "train", "d.jsonl", "-o", "m.bagc", "--search", "--allowance", "2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_categories_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "bagclass", "train", "d.jsonl", "-o", "m.bagc", "--categories", "spam,ham",
        ])
        .unwrap();
        match cli.command {
            Commands::Train { categories, .. } => {
                assert_eq!(categories, Some(vec!["spam".to_string(), "ham".to_string()]))
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
