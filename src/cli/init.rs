//! Init command - write an example bagclass.toml

use anyhow::{Context, Result};
use bagclass::config::Settings;
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let (config_path, created) = Settings::init_project_config(&dir)?;
    if created {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    }

    if let Some(user) = Settings::user_config_path() {
        println!(
            "\n{} User-wide settings can go in {}",
            style("Tip:").dim(),
            style(user.display()).dim()
        );
    }
    Ok(())
}
