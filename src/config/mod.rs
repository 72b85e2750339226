//! Configuration module for bagclass
//!
//! This module handles:
//! - Project-level configuration (bagclass.toml)
//! - User-level configuration (~/.config/bagclass/config.toml)
//! - Environment overrides (BAGCLASS_SEED)

mod settings;

pub use settings::{SearchSettings, Settings, ThresholdSettings, PROJECT_CONFIG_FILE};
