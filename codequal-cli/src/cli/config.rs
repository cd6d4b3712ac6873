//! Config commands - write an example file, show the resolved values

use crate::config::{init_config_file, user_config_path, Config};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

pub fn init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => user_config_path().context("Could not determine the user config directory")?,
    };

    if init_config_file(&path)? {
        println!("{} Created {}", style("✓").green(), style(path.display()).cyan());
    } else {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}

pub fn show(config_file: Option<&Path>) -> Result<()> {
    let config = Config::load(config_file).context("Failed to load configuration")?;
    let rendered = config.to_masked_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
