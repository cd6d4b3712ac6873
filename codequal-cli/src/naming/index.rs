//! Vector index of known vocabulary
//!
//! `PineconeIndex` speaks the Pinecone data-plane REST API;
//! `InMemoryIndex` is a brute-force cosine index for offline runs and tests.

use super::{make_agent, read_response, ServiceError, ServiceResult};
use crate::config::{ConfigError, NamingConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::time::Duration;
use tracing::debug;

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// One vector to store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub trait VectorIndex {
    /// Up to `top_k` matches, best first
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> ServiceResult<Vec<IndexMatch>>;

    /// Insert or replace records by id; returns the number written
    fn upsert(&self, records: &[IndexRecord]) -> ServiceResult<usize>;

    fn delete(&self, ids: &[String]) -> ServiceResult<()>;
}

impl<T: VectorIndex + ?Sized> VectorIndex for &T {
    fn query(&self, vector: &[f32], top_k: usize, include_metadata: bool) -> ServiceResult<Vec<IndexMatch>> {
        (**self).query(vector, top_k, include_metadata)
    }

    fn upsert(&self, records: &[IndexRecord]) -> ServiceResult<usize> {
        (**self).upsert(records)
    }

    fn delete(&self, ids: &[String]) -> ServiceResult<()> {
        (**self).delete(ids)
    }
}

impl<T: VectorIndex + ?Sized> VectorIndex for Box<T> {
    fn query(&self, vector: &[f32], top_k: usize, include_metadata: bool) -> ServiceResult<Vec<IndexMatch>> {
        (**self).query(vector, top_k, include_metadata)
    }

    fn upsert(&self, records: &[IndexRecord]) -> ServiceResult<usize> {
        (**self).upsert(records)
    }

    fn delete(&self, ids: &[String]) -> ServiceResult<()> {
        (**self).delete(ids)
    }
}

// ---------------------------------------------------------------------------
// Pinecone
// ---------------------------------------------------------------------------

/// Pinecone index client (data plane, keyed by index host)
pub struct PineconeIndex {
    host: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<IndexMatch>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexRecord],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

impl PineconeIndex {
    /// `host` is the index endpoint, e.g. `https://words-abc123.svc.pinecone.io`
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut host = host.into();
        if !host.starts_with("http://") && !host.starts_with("https://") {
            host = format!("https://{host}");
        }
        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            agent: make_agent(None),
        }
    }

    pub fn from_config(config: &NamingConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.index_host()?, config.api_key()?).with_timeout(config.timeout()))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent = make_agent(timeout);
        self
    }

    fn post<B: Serialize, T: serde::de::DeserializeOwned>(&self, path: &str, body: &B) -> ServiceResult<T> {
        let url = format!("{}{}", self.host, path);
        let response = self
            .agent
            .post(url.as_str())
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .send_json(body);
        read_response(response)
    }
}

impl VectorIndex for PineconeIndex {
    fn query(&self, vector: &[f32], top_k: usize, include_metadata: bool) -> ServiceResult<Vec<IndexMatch>> {
        let response: QueryResponse = self.post(
            "/query",
            &QueryRequest {
                vector,
                top_k,
                include_metadata,
            },
        )?;
        Ok(response.matches)
    }

    fn upsert(&self, records: &[IndexRecord]) -> ServiceResult<usize> {
        let response: UpsertResponse = self.post("/vectors/upsert", &UpsertRequest { vectors: records })?;
        debug!("Upserted {} vectors", response.upserted_count);
        Ok(response.upserted_count)
    }

    fn delete(&self, ids: &[String]) -> ServiceResult<()> {
        let _: Value = self.post("/vectors/delete", &DeleteRequest { ids })?;
        debug!("Deleted {} vectors", ids.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Brute-force cosine-similarity index
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    records: RefCell<Vec<IndexRecord>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.borrow().iter().any(|r| r.id == id)
    }
}

impl VectorIndex for InMemoryIndex {
    fn query(&self, vector: &[f32], top_k: usize, include_metadata: bool) -> ServiceResult<Vec<IndexMatch>> {
        let records = self.records.borrow();
        if let Some(record) = records.iter().find(|r| r.values.len() != vector.len()) {
            return Err(ServiceError::Api {
                status: 400,
                message: format!(
                    "vector dimension {} does not match index dimension {}",
                    vector.len(),
                    record.values.len()
                ),
            });
        }

        let mut matches: Vec<IndexMatch> = records
            .iter()
            .map(|record| IndexMatch {
                id: record.id.clone(),
                score: cosine(vector, &record.values),
                metadata: include_metadata.then(|| record.metadata.clone()),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    fn upsert(&self, records: &[IndexRecord]) -> ServiceResult<usize> {
        let mut stored = self.records.borrow_mut();
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => stored.push(record.clone()),
            }
        }
        Ok(records.len())
    }

    fn delete(&self, ids: &[String]) -> ServiceResult<()> {
        self.records.borrow_mut().retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}
