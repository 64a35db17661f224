//! Write the default configuration.

use std::path::PathBuf;

use shotcraft_common::config::{config_file_path, AppConfig};

pub fn run(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Config written to {}", path.display());
    println!("  Padding: {}", config.style.padding);
    println!("  Corner radius: {}", config.style.corner_radius);
    println!("  Background: {}", config.style.background_id);
    println!("  Debounce: {} ms", config.render.debounce_ms);
    Ok(())
}
