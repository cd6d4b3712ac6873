//! Naming quality via embedding similarity search
//!
//! An identifier is split into candidate words. Each word is embedded and
//! looked up in a vector index of known vocabulary; a word scores its best
//! similarity when that clears the threshold and 0 otherwise. The identifier
//! score is the mean over its words.
//!
//! Network access uses ureq (sync HTTP), no async runtime.

pub mod embedding;
pub mod index;
pub mod split;
pub mod vocabulary;

pub use embedding::{embed_words, Embedder, HttpEmbedder};
pub use index::{InMemoryIndex, IndexMatch, IndexRecord, PineconeIndex, VectorIndex};
pub use split::{candidate_words, split_runs, to_snake_case};
pub use vocabulary::{delete_words, load_dictionary, UploadStats, VocabularyWriter};

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Similarity a word must exceed to count as a known word
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.94;

/// Scale from the raw [-1, 1] score to the reported 0-10 scale
pub const NAME_SCORE_SCALE: f64 = 10.0;

/// Errors from the embedding or index services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Service error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse service response: {0}")]
    Parse(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum NamingError {
    #[error("No scoreable words in identifier '{identifier}'")]
    NoScoreableWords { identifier: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[source] ServiceError),

    #[error("Vector index failed: {0}")]
    Index(#[source] ServiceError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Build the shared sync HTTP agent
pub(crate) fn make_agent(timeout: Option<Duration>) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are mapped to ServiceError::Api
        .timeout_global(timeout)
        .build()
        .new_agent()
}

/// Turn a ureq response into JSON, mapping failure statuses to errors
pub(crate) fn read_response<T: DeserializeOwned>(
    response: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> ServiceResult<T> {
    let response = response.map_err(|e| ServiceError::Request(e.to_string()))?;

    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.into_body().read_to_string().unwrap_or_default();
        return Err(ServiceError::Api { status, message });
    }

    response
        .into_body()
        .read_json()
        .map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Scale a raw naming score to the reported integer, rounding half to even
pub fn reported_score(raw: f64) -> i64 {
    (raw * NAME_SCORE_SCALE).round_ties_even() as i64
}

/// Scores identifiers against a vocabulary index
pub struct NamingScorer<E, I> {
    embedder: E,
    index: I,
    threshold: f64,
}

impl<E: Embedder, I: VectorIndex> NamingScorer<E, I> {
    pub fn new(embedder: E, index: I) -> Self {
        Self {
            embedder,
            index,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Raw naming score in [-1, 1]
    pub fn score(&self, identifier: &str) -> Result<f64, NamingError> {
        let words = candidate_words(identifier);
        if words.is_empty() {
            return Err(NamingError::NoScoreableWords {
                identifier: identifier.to_string(),
            });
        }

        let vectors = embed_words(&self.embedder, &words).map_err(NamingError::Embedding)?;

        let mut scores = Vec::with_capacity(words.len());
        for (word, vector) in words.iter().zip(&vectors) {
            let matches = self
                .index
                .query(vector, 1, true)
                .map_err(NamingError::Index)?;

            let Some(best) = matches.first() else {
                debug!("No index match for '{}'", word);
                continue;
            };

            let score = if best.score > self.threshold {
                best.score.clamp(-1.0, 1.0)
            } else {
                0.0
            };
            debug!("Word '{}' -> '{}' ({:.4}) scored {}", word, best.id, best.score, score);
            scores.push(score);
        }

        if scores.is_empty() {
            return Err(NamingError::NoScoreableWords {
                identifier: identifier.to_string(),
            });
        }

        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    pub fn score_many<S: AsRef<str>>(&self, names: &[S]) -> Vec<Result<f64, NamingError>> {
        names.iter().map(|name| self.score(name.as_ref())).collect()
    }
}
