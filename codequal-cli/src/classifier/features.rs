//! Feature rows fed to the learned models
//!
//! Column order is part of the model artifact contract: a model trained on
//! one order gives garbage on another.

use crate::models::MetricVector;

pub const SMELL_FEATURE_COUNT: usize = 19;
pub const GENERAL_FEATURE_COUNT: usize = 13;

/// Column names of [`smell_features`], in order
pub const SMELL_FEATURE_NAMES: [&str; SMELL_FEATURE_COUNT] = [
    "total_lines",
    "logical_lines",
    "lines_of_code",
    "comments",
    "single_comments",
    "multi_comments",
    "blanks",
    "unique_operators",
    "unique_operands",
    "total_operators",
    "total_operands",
    "vocabulary",
    "length",
    "calculated_length",
    "volume",
    "difficulty",
    "effort",
    "time",
    "bugs",
];

/// Column names of [`general_features`], in order
pub const GENERAL_FEATURE_NAMES: [&str; GENERAL_FEATURE_COUNT] = [
    "complexity",
    "volume",
    "difficulty",
    "effort",
    "bugs",
    "time",
    "total_lines",
    "comments",
    "blanks",
    "unique_operators",
    "unique_operands",
    "total_operators",
    "total_operands",
];

/// Input row of the large-class and long-method models
pub fn smell_features(m: &MetricVector) -> [f64; SMELL_FEATURE_COUNT] {
    [
        m.total_lines_of_code as f64,
        m.logical_lines_of_code as f64,
        m.lines_of_code as f64,
        m.comments as f64,
        m.single_comments as f64,
        m.multi_comments as f64,
        m.blanks as f64,
        m.unique_operators as f64,
        m.unique_operands as f64,
        m.total_operators as f64,
        m.total_operands as f64,
        m.vocabulary as f64,
        m.length as f64,
        m.calculated_length,
        m.volume,
        m.difficulty,
        m.effort,
        m.time,
        m.bugs,
    ]
}

/// Input row of the general-quality model
pub fn general_features(m: &MetricVector) -> [f64; GENERAL_FEATURE_COUNT] {
    [
        m.complexity,
        m.volume,
        m.difficulty,
        m.effort,
        m.bugs,
        m.time,
        m.total_lines as f64,
        m.comments as f64,
        m.blanks as f64,
        m.unique_operators as f64,
        m.unique_operands as f64,
        m.total_operators as f64,
        m.total_operands as f64,
    ]
}
