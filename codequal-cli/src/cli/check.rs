//! Check command - score every entity in the given files

use crate::config::Config;
use crate::pipeline::ServicePipeline;
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub fn run(config_file: Option<&Path>, files: &[PathBuf], format: &str, output: Option<&Path>) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let config = Config::load(config_file).context("Failed to load configuration")?;
    let pipeline = ServicePipeline::from_config(&config).context("Failed to set up the scoring pipeline")?;

    let reports = pipeline.score_files(files).context("Scoring failed")?;
    let total: usize = reports.iter().map(|r| r.results.len()).sum();
    info!("Scored {} entities in {} files", total, reports.len());

    match output {
        Some(path) => {
            let rendered = reporters::report_with_format(&reports, format, false)?;
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Wrote {} results to {}",
                style("✓").green(),
                total,
                style(path.display()).cyan()
            );
        }
        None => {
            let color = console::colors_enabled();
            let rendered = reporters::report_with_format(&reports, format, color)?;
            print!("{}", rendered);
        }
    }

    Ok(())
}
