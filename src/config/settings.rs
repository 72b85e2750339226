//! Training and search settings
//!
//! Supports loading config from:
//! - Environment variables
//! - ./bagclass.toml
//! - ~/.config/bagclass/config.toml
//!
//! # Configuration Format
//!
//! ```toml
//! seed = 42
//!
//! [thresholds]
//! allowance = 1.5
//! maxscore = 400
//!
//! [search]
//! allowances = [0, 1.1, 1.5, 2, 5]
//! maxscores = [0, 1000, 100, 10]
//! verbose = false
//! ```

use crate::classifier::trainer::DEFAULT_SEED;
use crate::classifier::{ClassifierResult, SearchGrid, Thresholds};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "bagclass.toml";

const SEED_ENV: &str = "BAGCLASS_SEED";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Sampling seed (default: fixed built-in seed)
    pub seed: Option<u64>,

    #[serde(default)]
    pub thresholds: ThresholdSettings,

    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ThresholdSettings {
    /// Minimum per-replicate weight (0 = no minimum)
    pub allowance: Option<f64>,

    /// Per-replicate weight cap (0 = no cap)
    pub maxscore: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Allowance candidates (default: built-in list)
    pub allowances: Option<Vec<f64>>,

    /// Maxscore candidates (default: built-in list)
    pub maxscores: Option<Vec<f64>>,

    /// Report every combination
    pub verbose: Option<bool>,
}

impl Settings {
    /// Load settings from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. Project config (`<dir>/bagclass.toml`)
    /// 3. User config (~/.config/bagclass/config.toml)
    pub fn load(dir: &Path) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(user) = Self::user_config_path().and_then(|p| read_file(&p)) {
            settings.merge(user);
        }
        if let Some(project) = read_file(&dir.join(PROJECT_CONFIG_FILE)) {
            settings.merge(project);
        }

        if let Ok(raw) = std::env::var(SEED_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => settings.seed = Some(seed),
                Err(_) => warn!("Ignoring {}={:?}: not an unsigned integer", SEED_ENV, raw),
            }
        }

        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bagclass").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: Settings) {
        if other.seed.is_some() {
            self.seed = other.seed;
        }
        if other.thresholds.allowance.is_some() {
            self.thresholds.allowance = other.thresholds.allowance;
        }
        if other.thresholds.maxscore.is_some() {
            self.thresholds.maxscore = other.thresholds.maxscore;
        }
        if other.search.allowances.is_some() {
            self.search.allowances = other.search.allowances;
        }
        if other.search.maxscores.is_some() {
            self.search.maxscores = other.search.maxscores;
        }
        if other.search.verbose.is_some() {
            self.search.verbose = other.search.verbose;
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Configured thresholds, unset values meaning "no limit"
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(
            self.thresholds.allowance.unwrap_or(0.0),
            self.thresholds.maxscore.unwrap_or(0.0),
        )
    }

    /// Search grid, falling back to the built-in candidate lists per axis
    pub fn search_grid(&self) -> ClassifierResult<SearchGrid> {
        let default = SearchGrid::default();
        SearchGrid::new(
            self.search
                .allowances
                .clone()
                .unwrap_or_else(|| default.allowances().to_vec()),
            self.search
                .maxscores
                .clone()
                .unwrap_or_else(|| default.maxscores().to_vec()),
        )
    }

    pub fn verbose(&self) -> bool {
        self.search.verbose.unwrap_or(false)
    }

    /// Write an example project config into `dir`, unless one exists
    pub fn init_project_config(dir: &Path) -> Result<(PathBuf, bool)> {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            return Ok((config_path, false));
        }

        let example = r#"# bagclass configuration

# Sampling seed. The same seed and data always give the same model.
# seed = 42

[thresholds]
# Minimum per-replicate token weight that counts (0 = no minimum)
# allowance = 0

# Cap on each per-replicate token weight (0 = no cap)
# maxscore = 0

[search]
# Candidate lists for `bagclass search` (default: built-in 51 x 46 grid)
# allowances = [0, 1.05, 1.1, 1.5, 2, 5, 10]
# maxscores = [0, 1000, 100, 10]
# verbose = false
"#;
        std::fs::write(&config_path, example)?;
        Ok((config_path, true))
    }
}

/// Read one config file, warning (not failing) on parse errors
fn read_file(path: &Path) -> Option<Settings> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match Settings::from_toml(&content) {
        Ok(settings) => {
            debug!("Loaded config from {}", path.display());
            Some(settings)
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}
