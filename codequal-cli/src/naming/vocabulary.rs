//! Bulk vocabulary indexing
//!
//! Loads a word-frequency dataset and writes its words into the vector index
//! in batches. A failed batch is logged and recorded in a side file so it can
//! be retried; the upload carries on with the next batch.

use super::{embed_words, Embedder, IndexRecord, NamingError, VectorIndex};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Only the most frequent words are indexed
pub const MAX_DICTIONARY_WORDS: usize = 30_000;

pub const HANDLED_WORDS_FILE: &str = "handled_words.csv";
pub const NOT_HANDLED_WORDS_FILE: &str = "non_handled_words.csv";

/// Read the first column of a `;`-delimited word-frequency file.
///
/// Fields follow CSV quoting rules and are taken as-is, so a field with
/// padding or an embedded delimiter is not a word. Keeps non-empty
/// all-alphabetic words, caps the list at [`MAX_DICTIONARY_WORDS`], then
/// drops repeats (first occurrence wins).
pub fn load_dictionary(path: &Path) -> Result<Vec<String>, NamingError> {
    let file = std::fs::File::open(path).map_err(|source| NamingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut words = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| NamingError::Dataset {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(field) = record.get(0) {
            words.push(field.to_string());
        }
    }

    words.retain(|word| !word.is_empty() && word.chars().all(char::is_alphabetic));
    words.truncate(MAX_DICTIONARY_WORDS);

    let mut seen = HashSet::new();
    words.retain(|word| seen.insert(word.clone()));

    info!("Loaded {} unique words from {}", words.len(), path.display());
    Ok(words)
}

/// Outcome of an upload run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadStats {
    pub total: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Writes vocabulary into a vector index in batches
pub struct VocabularyWriter<E, I> {
    embedder: E,
    index: I,
    batch_size: usize,
    handled_file: PathBuf,
    not_handled_file: PathBuf,
}

impl<E: Embedder, I: VectorIndex> VocabularyWriter<E, I> {
    pub fn new(embedder: E, index: I) -> Self {
        Self {
            embedder,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
            handled_file: PathBuf::from(HANDLED_WORDS_FILE),
            not_handled_file: PathBuf::from(NOT_HANDLED_WORDS_FILE),
        }
    }

    /// Zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_side_files(mut self, handled: impl Into<PathBuf>, not_handled: impl Into<PathBuf>) -> Self {
        self.handled_file = handled.into();
        self.not_handled_file = not_handled.into();
        self
    }

    fn records(&self, words: &[String]) -> Result<Vec<IndexRecord>, NamingError> {
        let vectors = embed_words(&self.embedder, words).map_err(NamingError::Embedding)?;

        let mut metadata = Map::new();
        metadata.insert(
            "created_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        Ok(words
            .iter()
            .zip(vectors)
            .map(|(word, values)| IndexRecord {
                id: word.clone(),
                values,
                metadata: metadata.clone(),
            })
            .collect())
    }

    fn upload_batch(&self, words: &[String]) -> Result<(), NamingError> {
        let records = self.records(words)?;
        self.index.upsert(&records).map_err(NamingError::Index)?;
        Ok(())
    }

    /// Embed and upsert `words` batch by batch.
    ///
    /// Service failures only fail their batch. Side-file write errors abort.
    pub fn upload(&self, words: &[String]) -> Result<UploadStats, NamingError> {
        let mut stats = UploadStats {
            total: words.len(),
            ..Default::default()
        };

        for batch in words.chunks(self.batch_size) {
            stats.batches += 1;
            match self.upload_batch(batch) {
                Ok(()) => {
                    append_words(&self.handled_file, batch)?;
                    stats.uploaded += batch.len();
                    info!("{}/{} words were saved", stats.uploaded, stats.total);
                }
                Err(e) => {
                    warn!("Error while uploading words batch {}: {}", stats.batches, e);
                    append_words(&self.not_handled_file, batch)?;
                    stats.failed += batch.len();
                    stats.failed_batches += 1;
                    warn!("{}/{} words weren't saved", stats.failed, stats.total);
                }
            }
            info!(
                "Total {}/{} words were handled",
                stats.uploaded + stats.failed,
                stats.total
            );
        }

        Ok(stats)
    }

    pub fn delete(&self, words: &[String]) -> Result<usize, NamingError> {
        delete_words(&self.index, words, self.batch_size)
    }
}

/// Delete `words` from the index batch by batch; the first failure stops
/// the run. Returns the number of ids sent.
pub fn delete_words<I: VectorIndex>(index: &I, words: &[String], batch_size: usize) -> Result<usize, NamingError> {
    let mut deleted = 0;
    for batch in words.chunks(batch_size.max(1)) {
        index.delete(batch).map_err(NamingError::Index)?;
        deleted += batch.len();
        info!("{}/{} words were deleted", deleted, words.len());
    }
    Ok(deleted)
}

fn append_words(path: &Path, words: &[String]) -> Result<(), NamingError> {
    let io_error = |source| NamingError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;
    for word in words {
        writeln!(file, "{word}").map_err(io_error)?;
    }
    Ok(())
}
