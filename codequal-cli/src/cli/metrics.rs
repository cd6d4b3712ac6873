//! Metrics command - dump metric vectors as JSON

use crate::pipeline::collect_metrics;
use crate::reporters::to_pretty;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(files: &[PathBuf]) -> Result<()> {
    let records = collect_metrics(files).context("Failed to compute metrics")?;
    println!("{}", to_pretty(&records)?);
    Ok(())
}
