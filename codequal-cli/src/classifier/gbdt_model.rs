//! GBDT model wrapper
//!
//! Wraps the `gbdt` crate to provide:
//! - Model loading from the gbdt-rs native JSON format, with the declared
//!   feature width read from `conf.feature_size`
//! - Single-row inference behind [`ScoringModel`]
//! - A training helper that produces artifacts in the same format
//!
//! Note: the gbdt crate works in `f32` (`ValueType`) while metric vectors
//! are `f64`. Conversions happen at the crate boundary.

use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde_json::Value;
use tracing::debug;

use super::{ClassifierError, ScoringModel};

#[inline]
fn row_to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`.
pub struct GbdtModel {
    model: GBDT,
    input_size: Option<usize>,
}

impl GbdtModel {
    /// Load a model from a gbdt-rs JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let json = std::fs::read_to_string(path).map_err(|e| ClassifierError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model = Self::from_json(&json).map_err(|e| match e {
            ClassifierError::ModelLoad { reason, .. } => ClassifierError::ModelLoad {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        debug!(
            "Loaded GBDT model from {} (features: {:?})",
            path.display(),
            model.input_size
        );
        Ok(model)
    }

    /// Load a model from a JSON string (gbdt-rs native format).
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let parse_error = |e: serde_json::Error| ClassifierError::ModelLoad {
            path: Default::default(),
            reason: format!("failed to parse GBDT JSON: {e}"),
        };

        let value: Value = serde_json::from_str(json).map_err(parse_error)?;
        let input_size = value
            .get("conf")
            .and_then(|conf| conf.get("feature_size"))
            .and_then(Value::as_u64)
            .map(|size| size as usize);
        let model: GBDT = serde_json::from_value(value).map_err(parse_error)?;

        Ok(Self { model, input_size })
    }

    /// Wrap an already-trained `GBDT` instance.
    pub fn from_trained(model: GBDT, input_size: usize) -> Self {
        Self {
            model,
            input_size: Some(input_size),
        }
    }

    /// Serialize to the gbdt-rs JSON format accepted by [`GbdtModel::load`].
    pub fn to_json(&self) -> Result<String, ClassifierError> {
        serde_json::to_string(&self.model).map_err(|e| ClassifierError::Training(e.to_string()))
    }

    /// Save the model to disk as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ClassifierError> {
        std::fs::write(path, self.to_json()?).map_err(|e| ClassifierError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("failed to save GBDT model: {e}"),
        })
    }
}

impl ScoringModel for GbdtModel {
    fn input_size(&self) -> Option<usize> {
        self.input_size
    }

    fn predict(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        self.check_shape(row.len())?;
        let data = vec![Data::new_test_data(row_to_f32(row), None)];
        let preds = self.model.predict(&data);
        preds
            .first()
            .map(|&p| p as f64)
            .ok_or(ClassifierError::EmptyPrediction)
    }
}

/// Train a GBDT model from labelled rows.
///
/// - `rows`: feature rows, all the same width
/// - `labels`: 1.0 for positive, -1.0 for negative (`LogLikelyhood` convention)
/// - `num_trees`: boosting iterations
/// - `max_depth`: maximum tree depth
/// - `learning_rate`: shrinkage
pub fn train_gbdt(
    rows: &[Vec<f64>],
    labels: &[f64],
    num_trees: usize,
    max_depth: u32,
    learning_rate: f64,
) -> Result<GbdtModel, ClassifierError> {
    let Some(first) = rows.first() else {
        return Err(ClassifierError::Training("no training samples provided".into()));
    };
    if rows.len() != labels.len() {
        return Err(ClassifierError::Training(format!(
            "row count ({}) does not match label count ({})",
            rows.len(),
            labels.len()
        )));
    }

    let feature_size = first.len();
    if let Some(bad) = rows.iter().find(|row| row.len() != feature_size) {
        return Err(ClassifierError::ShapeMismatch {
            expected: feature_size,
            actual: bad.len(),
        });
    }

    let mut cfg = Config::new();
    cfg.set_feature_size(feature_size);
    cfg.set_max_depth(max_depth);
    cfg.set_iterations(num_trees);
    cfg.set_shrinkage(learning_rate as f32);
    cfg.set_loss("LogLikelyhood");
    cfg.set_debug(false);
    cfg.set_training_optimization_level(2);
    cfg.set_min_leaf_size(1);

    let mut gbdt = GBDT::new(&cfg);

    let mut training_data: Vec<Data> = rows
        .iter()
        .zip(labels.iter())
        .map(|(row, &label)| Data::new_training_data(row_to_f32(row), 1.0_f32, label as f32, None))
        .collect();

    gbdt.fit(&mut training_data);

    Ok(GbdtModel::from_trained(gbdt, feature_size))
}
