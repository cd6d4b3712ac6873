//! Learned classifiers over metric vectors
//!
//! Two binary smell models (large class, long method) and an optional
//! general-quality regressor. Models are gbdt-rs artifacts loaded once per
//! run and injected into the classifiers as [`ScoringModel`] handles.

pub mod features;
pub mod gbdt_model;
pub mod general;
pub mod smell;

pub use features::{general_features, smell_features, GENERAL_FEATURE_COUNT, SMELL_FEATURE_COUNT};
pub use gbdt_model::{train_gbdt, GbdtModel};
pub use general::GeneralQualityModel;
pub use smell::{SmellClassifier, SmellPrediction};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or running a model
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("No {model} model configured (set it under [models] in codequal.toml)")]
    NotConfigured { model: &'static str },

    #[error("Model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model produced no prediction")]
    EmptyPrediction,

    #[error("Training failed: {0}")]
    Training(String),
}

/// A loaded model that maps one feature row to one output value
pub trait ScoringModel {
    /// Declared input width, when the artifact records one
    fn input_size(&self) -> Option<usize>;

    fn predict(&self, row: &[f64]) -> Result<f64, ClassifierError>;

    /// Reject rows whose width differs from the declared input size
    fn check_shape(&self, actual: usize) -> Result<(), ClassifierError> {
        match self.input_size() {
            Some(expected) if expected != actual => {
                Err(ClassifierError::ShapeMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

impl<M: ScoringModel + ?Sized> ScoringModel for Box<M> {
    fn input_size(&self) -> Option<usize> {
        (**self).input_size()
    }

    fn predict(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        (**self).predict(row)
    }
}
