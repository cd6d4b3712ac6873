//! Sentence embeddings for candidate words
//!
//! `HttpEmbedder` talks to any OpenAI-compatible `/embeddings` endpoint
//! (OpenAI, a local text-embeddings server, Ollama, ...).

use super::{make_agent, read_response, ServiceError, ServiceResult};
use crate::config::{ConfigError, NamingConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Embedding model used for the vocabulary index
pub const DEFAULT_EMBEDDING_MODEL: &str = "intfloat/e5-small-v2";

/// Maps words to unit-length vectors
pub trait Embedder {
    /// One vector per input word, in input order
    fn embed(&self, words: &[String]) -> ServiceResult<Vec<Vec<f32>>>;
}

impl<T: Embedder + ?Sized> Embedder for &T {
    fn embed(&self, words: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        (**self).embed(words)
    }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed(&self, words: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        (**self).embed(words)
    }
}

/// Embed `words` and check that every word got exactly one vector
pub fn embed_words<E: Embedder + ?Sized>(embedder: &E, words: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
    let vectors = embedder.embed(words)?;
    if vectors.len() != words.len() {
        return Err(ServiceError::Parse(format!(
            "expected {} embeddings, got {}",
            words.len(),
            vectors.len()
        )));
    }
    Ok(vectors)
}

/// Scale a vector to unit length (zero vectors are left alone)
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Embedding client over sync HTTP
pub struct HttpEmbedder {
    url: String,
    model: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            api_key: None,
            agent: make_agent(None),
        }
    }

    /// Client for the configured embedding endpoint
    pub fn from_config(config: &NamingConfig) -> Result<Self, ConfigError> {
        let mut embedder = Self::new(config.embedding_url()?, config.embedding_model.as_str())
            .with_timeout(config.timeout());
        if let Some(key) = &config.embedding_api_key {
            embedder = embedder.with_api_key(key.as_str());
        }
        Ok(embedder)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent = make_agent(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, words: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: words,
        };

        let mut req = self
            .agent
            .post(self.url.as_str())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", &format!("Bearer {key}"));
        }

        let mut response: EmbeddingResponse = read_response(req.send_json(&body))?;
        if response.data.len() != words.len() {
            return Err(ServiceError::Parse(format!(
                "expected {} embeddings, got {}",
                words.len(),
                response.data.len()
            )));
        }

        // Servers may return entries out of order; `index` is authoritative
        response.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        debug!("Embedded {} words with {}", words.len(), self.model);
        Ok(response
            .data
            .into_iter()
            .map(|d| {
                let mut vector = d.embedding;
                normalize(&mut vector);
                vector
            })
            .collect())
    }
}
