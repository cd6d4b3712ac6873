//! Per-entity quality score aggregation
//!
//! # Scoring Formula
//!
//! ```text
//! General Score = MI × 0.08 + Naming × 0.2 − Smell × 0.2
//!
//! Where:
//!   MI      = maintainability index, 0-100
//!   Naming  = reported naming score, 0-10
//!   Smell   = thresholded smell model output, 0 or 1
//! ```
//!
//! The result is rounded half-to-even to one decimal and reported on a
//! "/10" scale without clamping.
//!
//! # Example
//!
//! MI 80.0, naming 7, no smell → 80 × 0.08 + 7 × 0.2 = 7.8;
//! with a smell → 7.8 − 0.2 = 7.6

use serde::{Deserialize, Serialize};

pub const MAINTAINABILITY_WEIGHT: f64 = 0.08;
pub const NAMING_WEIGHT: f64 = 0.2;
pub const SMELL_PENALTY: f64 = 0.2;

/// Scale from the 0-100 maintainability index to the reported "/10" value
pub const MAINTAINABILITY_REPORT_SCALE: f64 = 10.0;

/// Aggregation weights, overridable from `[scoring]` in the config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub maintainability_weight: f64,
    pub naming_weight: f64,
    pub smell_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            maintainability_weight: MAINTAINABILITY_WEIGHT,
            naming_weight: NAMING_WEIGHT,
            smell_penalty: SMELL_PENALTY,
        }
    }
}

/// Aggregated score with the maintainability index it was built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub general_score: f64,
    pub maintainability: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator {
    weights: ScoringWeights,
}

impl ScoreAggregator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn aggregate(&self, maintainability: f64, naming: i64, smell_raw: u8) -> Aggregate {
        let mut score =
            maintainability * self.weights.maintainability_weight + naming as f64 * self.weights.naming_weight;
        if smell_raw != 0 {
            score -= smell_raw as f64 * self.weights.smell_penalty;
        }

        Aggregate {
            general_score: round_to_tenth(score),
            maintainability,
        }
    }
}

/// Round half to even at one decimal
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Maintainability as reported next to the general score ("/10", 1 decimal)
pub fn reported_maintainability(maintainability: f64) -> f64 {
    round_to_tenth(maintainability / MAINTAINABILITY_REPORT_SCALE)
}
