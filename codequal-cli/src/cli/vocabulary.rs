//! Vocabulary commands - bulk upload and delete of index words

use crate::config::Config;
use crate::naming::{delete_words, load_dictionary, HttpEmbedder, PineconeIndex, VocabularyWriter};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

pub fn upload(
    config_file: Option<&Path>,
    dataset: &Path,
    batch_size: usize,
    handled_file: PathBuf,
    not_handled_file: PathBuf,
) -> Result<()> {
    let config = Config::load(config_file).context("Failed to load configuration")?;
    let words = load_dictionary(dataset)?;

    let writer = VocabularyWriter::new(
        HttpEmbedder::from_config(&config.naming)?,
        PineconeIndex::from_config(&config.naming)?,
    )
    .with_batch_size(batch_size)
    .with_side_files(handled_file, not_handled_file);
    let stats = writer.upload(&words).context("Vocabulary upload failed")?;

    println!(
        "{} Uploaded {}/{} words in {} batches",
        style("✓").green(),
        stats.uploaded,
        stats.total,
        stats.batches
    );
    if stats.failed > 0 {
        println!(
            "{} {} words in {} failed batches were not saved",
            style("!").yellow(),
            stats.failed,
            stats.failed_batches
        );
    }
    Ok(())
}

pub fn delete(config_file: Option<&Path>, dataset: &Path, batch_size: usize) -> Result<()> {
    let config = Config::load(config_file).context("Failed to load configuration")?;
    let words = load_dictionary(dataset)?;

    let deleted = delete_words(&PineconeIndex::from_config(&config.naming)?, &words, batch_size)
        .context("Vocabulary delete failed")?;

    println!("{} Deleted {} words", style("✓").green(), deleted);
    Ok(())
}
