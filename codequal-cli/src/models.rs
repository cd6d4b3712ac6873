//! Core data models for codequal
//!
//! These models are shared by the extraction, metric, classification and
//! reporting stages of the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of scorable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Class,
    /// `def` and `async def`
    Function,
}

impl FragmentKind {
    /// Both kinds, in the order the report driver processes them
    pub const ALL: [FragmentKind; 2] = [FragmentKind::Class, FragmentKind::Function];

    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Class => "class",
            FragmentKind::Function => "function",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted class or function definition
///
/// `text` is the exact source slice of the definition, formatting preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Size, Halstead and complexity metrics for one fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    // Raw line counts
    pub total_lines: usize,
    pub total_lines_of_code: usize,
    pub lines_of_code: usize,
    pub logical_lines_of_code: usize,
    pub comments: usize,
    pub single_comments: usize,
    pub multi_comments: usize,
    pub blanks: usize,

    // Halstead counts
    pub unique_operators: usize,
    pub unique_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
    pub vocabulary: usize,
    pub length: usize,
    /// Halstead program length `N1 + N2`
    pub program_length: usize,

    // Halstead derived values
    pub calculated_length: f64,
    pub volume: f64,
    /// Set to 1.0 when the Halstead difficulty is zero
    pub difficulty: f64,
    pub intelligence: f64,
    pub effort: f64,
    pub bugs: f64,
    pub time: f64,

    /// Mean McCabe complexity of the non-method blocks
    pub complexity: f64,
    /// Maintainability index, 0-100
    pub maintainability: f64,
}

/// Smell verdict for a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmellLabel {
    #[serde(rename = "No")]
    No,
    #[serde(rename = "Large Class")]
    LargeClass,
    #[serde(rename = "Long Method")]
    LongMethod,
}

impl SmellLabel {
    /// Map a thresholded model output to a label for the given entity kind
    pub fn from_score(raw_score: u8, kind: FragmentKind) -> Self {
        if raw_score == 0 {
            return SmellLabel::No;
        }
        match kind {
            FragmentKind::Class => SmellLabel::LargeClass,
            FragmentKind::Function => SmellLabel::LongMethod,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmellLabel::No => "No",
            SmellLabel::LargeClass => "Large Class",
            SmellLabel::LongMethod => "Long Method",
        }
    }
}

impl std::fmt::Display for SmellLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final quality record for one fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub entity_name: Option<String>,
    pub kind: FragmentKind,
    pub start_line: u32,
    /// Maintainability index, 0-100
    pub maintainability: f64,
    pub smell: SmellLabel,
    /// Naming quality on the 0-10 scale
    pub name_score: i64,
    pub general_score: f64,
    /// Output of the general-quality model, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_score: Option<f64>,
}

/// All score records for one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub results: Vec<ScoreResult>,
}
