//! Entity scoring pipeline
//!
//! For each input file:
//! 1. Parse and extract class fragments, then function fragments
//! 2. Compute the metric vector of each fragment
//! 3. Classify smells and score the entity name
//! 4. Aggregate into a [`ScoreResult`]
//!
//! Models and service clients are built once and shared by every fragment.

use crate::classifier::{ClassifierError, GeneralQualityModel, SmellClassifier};
use crate::config::{Config, ConfigError};
use crate::metrics::{MetricCalculator, MetricsError};
use crate::models::{FileReport, Fragment, FragmentKind, MetricVector, ScoreResult};
use crate::naming::{
    reported_score, Embedder, HttpEmbedder, NamingError, NamingScorer, PineconeIndex, VectorIndex,
};
use crate::parsers::{self, entity_name, ParseError, ParsedSource};
use crate::scoring::ScoreAggregator;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{path}:{line}: {source}")]
    Metrics {
        path: PathBuf,
        line: u32,
        #[source]
        source: MetricsError,
    },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Metric vector of one fragment, as printed by `codequal metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub path: PathBuf,
    pub kind: FragmentKind,
    pub entity_name: Option<String>,
    pub start_line: u32,
    pub metrics: MetricVector,
}

fn read_and_parse(path: &Path) -> Result<ParsedSource, PipelineError> {
    let source = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parsers::parse(&source).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Classes first, then functions; each group in document order
fn ordered_fragments(parsed: &ParsedSource) -> Vec<Fragment> {
    let mut fragments = parsed.extract_classes();
    fragments.extend(parsed.extract_functions());
    fragments
}

fn compute_metrics(
    calculator: &MetricCalculator,
    path: &Path,
    fragment: &Fragment,
) -> Result<MetricVector, PipelineError> {
    calculator
        .compute(fragment)
        .map_err(|source| PipelineError::Metrics {
            path: path.to_path_buf(),
            line: fragment.start_line,
            source,
        })
}

/// Metric vectors for every fragment of the given files; no models needed
pub fn collect_metrics(paths: &[PathBuf]) -> Result<Vec<MetricsRecord>, PipelineError> {
    let calculator = MetricCalculator::new();
    let mut records = Vec::new();

    for path in paths {
        let parsed = read_and_parse(path)?;
        for fragment in ordered_fragments(&parsed) {
            let metrics = compute_metrics(&calculator, path, &fragment)?;
            records.push(MetricsRecord {
                path: path.clone(),
                kind: fragment.kind,
                entity_name: entity_name(&fragment.text, fragment.kind),
                start_line: fragment.start_line,
                metrics,
            });
        }
    }

    Ok(records)
}

/// Pipeline over the HTTP embedding service and Pinecone index
pub type ServicePipeline = ScoringPipeline<Box<dyn Embedder>, Box<dyn VectorIndex>>;

pub struct ScoringPipeline<E, I> {
    calculator: MetricCalculator,
    smell: SmellClassifier,
    general: Option<GeneralQualityModel>,
    naming: NamingScorer<E, I>,
    aggregator: ScoreAggregator,
}

impl ServicePipeline {
    /// Load models and build service clients from a resolved config
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let smell = SmellClassifier::load(&config.models)?;
        let general = config
            .models
            .general_score
            .as_deref()
            .map(GeneralQualityModel::load)
            .transpose()?;

        let embedder = HttpEmbedder::from_config(&config.naming)?;
        let index = PineconeIndex::from_config(&config.naming)?;

        let embedder: Box<dyn Embedder> = Box::new(embedder);
        let index: Box<dyn VectorIndex> = Box::new(index);
        let naming = NamingScorer::new(embedder, index).with_threshold(config.naming.similarity_threshold);

        info!(
            "Pipeline ready (general model: {})",
            if general.is_some() { "yes" } else { "no" }
        );

        let mut pipeline = ScoringPipeline::new(smell, naming, ScoreAggregator::new(config.scoring));
        pipeline.general = general;
        Ok(pipeline)
    }
}

impl<E: Embedder, I: VectorIndex> ScoringPipeline<E, I> {
    pub fn new(smell: SmellClassifier, naming: NamingScorer<E, I>, aggregator: ScoreAggregator) -> Self {
        Self {
            calculator: MetricCalculator::new(),
            smell,
            general: None,
            naming,
            aggregator,
        }
    }

    pub fn with_general_model(mut self, model: GeneralQualityModel) -> Self {
        self.general = Some(model);
        self
    }

    /// Naming score on the 0-10 scale.
    ///
    /// Unnamed entities and identifiers without scoreable words get 0.
    fn name_score(&self, name: Option<&str>, fragment: &Fragment) -> Result<i64, PipelineError> {
        let Some(name) = name else {
            warn!(
                "Could not read the {} name at line {}; naming score is 0",
                fragment.kind, fragment.start_line
            );
            return Ok(0);
        };

        match self.naming.score(name) {
            Ok(raw) => Ok(reported_score(raw)),
            Err(NamingError::NoScoreableWords { identifier }) => {
                warn!("No scoreable words in '{}'; naming score is 0", identifier);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn score_fragment(&self, path: &Path, fragment: &Fragment) -> Result<ScoreResult, PipelineError> {
        let metrics = compute_metrics(&self.calculator, path, fragment)?;
        let name = entity_name(&fragment.text, fragment.kind);

        let smell = self.smell.classify(&metrics, fragment.kind)?;
        let name_score = self.name_score(name.as_deref(), fragment)?;
        let model_score = self
            .general
            .as_ref()
            .map(|model| model.predict(&metrics))
            .transpose()?;

        let aggregate = self
            .aggregator
            .aggregate(metrics.maintainability, name_score, smell.raw_score);

        debug!(
            "{} {} at line {}: score {}",
            fragment.kind,
            name.as_deref().unwrap_or("<unknown>"),
            fragment.start_line,
            aggregate.general_score
        );

        Ok(ScoreResult {
            entity_name: name,
            kind: fragment.kind,
            start_line: fragment.start_line,
            maintainability: aggregate.maintainability,
            smell: smell.label,
            name_score,
            general_score: aggregate.general_score,
            model_score,
        })
    }

    pub fn score_file(&self, path: &Path) -> Result<FileReport, PipelineError> {
        let parsed = read_and_parse(path)?;
        let results = ordered_fragments(&parsed)
            .iter()
            .map(|fragment| self.score_fragment(path, fragment))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Scored {} entities in {}", results.len(), path.display());
        Ok(FileReport {
            path: path.to_path_buf(),
            results,
        })
    }

    /// Score every file; the first error aborts the run
    pub fn score_files(&self, paths: &[PathBuf]) -> Result<Vec<FileReport>, PipelineError> {
        paths.iter().map(|path| self.score_file(path)).collect()
    }
}
