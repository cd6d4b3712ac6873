//! Large-class / long-method smell classification

use super::features::{smell_features, SMELL_FEATURE_COUNT};
use super::{ClassifierError, GbdtModel, ScoringModel};
use crate::config::ModelPaths;
use crate::models::{FragmentKind, MetricVector, SmellLabel};
use serde::Serialize;
use tracing::debug;

/// Thresholded model output and its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmellPrediction {
    /// 0 or 1
    pub raw_score: u8,
    pub label: SmellLabel,
}

/// Picks the smell model by entity kind and thresholds its output
pub struct SmellClassifier {
    large_class: Box<dyn ScoringModel>,
    long_method: Box<dyn ScoringModel>,
}

impl SmellClassifier {
    pub fn new(large_class: Box<dyn ScoringModel>, long_method: Box<dyn ScoringModel>) -> Self {
        Self {
            large_class,
            long_method,
        }
    }

    /// Load both smell models from disk
    pub fn load(paths: &ModelPaths) -> Result<Self, ClassifierError> {
        let large_class = paths
            .large_class
            .as_deref()
            .ok_or(ClassifierError::NotConfigured {
                model: "large_class",
            })?;
        let long_method = paths
            .long_method
            .as_deref()
            .ok_or(ClassifierError::NotConfigured {
                model: "long_method",
            })?;

        Ok(Self::new(
            Box::new(GbdtModel::load(large_class)?),
            Box::new(GbdtModel::load(long_method)?),
        ))
    }

    fn model_for(&self, kind: FragmentKind) -> &dyn ScoringModel {
        match kind {
            FragmentKind::Class => self.large_class.as_ref(),
            FragmentKind::Function => self.long_method.as_ref(),
        }
    }

    pub fn classify(
        &self,
        metrics: &MetricVector,
        kind: FragmentKind,
    ) -> Result<SmellPrediction, ClassifierError> {
        let model = self.model_for(kind);
        model.check_shape(SMELL_FEATURE_COUNT)?;

        let output = model.predict(&smell_features(metrics))?;
        let raw_score = threshold(output);
        let label = SmellLabel::from_score(raw_score, kind);

        debug!("Smell model output {:.4} for {} -> {}", output, kind, label);
        Ok(SmellPrediction { raw_score, label })
    }
}

/// Round half to even, then pin to {0, 1}
fn threshold(output: f64) -> u8 {
    if output.round_ties_even() >= 1.0 {
        1
    } else {
        0
    }
}
