//! Optional general-quality regressor
//!
//! Its output is reported next to the aggregated score but does not feed
//! into it.

use super::features::{general_features, GENERAL_FEATURE_COUNT};
use super::{ClassifierError, GbdtModel, ScoringModel};
use crate::models::MetricVector;
use std::path::Path;

pub struct GeneralQualityModel {
    model: Box<dyn ScoringModel>,
}

impl GeneralQualityModel {
    pub fn new(model: Box<dyn ScoringModel>) -> Self {
        Self { model }
    }

    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        Ok(Self::new(Box::new(GbdtModel::load(path)?)))
    }

    pub fn predict(&self, metrics: &MetricVector) -> Result<f64, ClassifierError> {
        self.model.check_shape(GENERAL_FEATURE_COUNT)?;
        self.model.predict(&general_features(metrics))
    }
}
