//! Output reporters for scoring results
//!
//! Supports two output formats:
//! - `text` - One block per entity, for terminals and logs
//! - `json` - Machine-readable JSON

mod json;
mod text;

pub use json::to_pretty;

use crate::models::FileReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render file reports in the given format; `color` only affects text
pub fn report_with_format(reports: &[FileReport], format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(reports, color),
        OutputFormat::Json => json::render(reports),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{FragmentKind, ScoreResult, SmellLabel};

    /// One file with a smelly class and an unnamed function
    pub(crate) fn test_reports() -> Vec<FileReport> {
        vec![FileReport {
            path: "src/orders.py".into(),
            results: vec![
                ScoreResult {
                    entity_name: Some("OrderService".into()),
                    kind: FragmentKind::Class,
                    start_line: 3,
                    maintainability: 71.93,
                    smell: SmellLabel::LargeClass,
                    name_score: 7,
                    general_score: 7.6,
                    model_score: None,
                },
                ScoreResult {
                    entity_name: None,
                    kind: FragmentKind::Function,
                    start_line: 12,
                    maintainability: 88.0,
                    smell: SmellLabel::No,
                    name_score: 0,
                    general_score: 7.0,
                    model_score: Some(6.4),
                },
            ],
        }]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::default().to_string(), "text");
    }

    #[test]
    fn test_report_with_format_dispatch() {
        let reports = test_reports();
        let json = report_with_format(&reports, OutputFormat::Json, true).unwrap();
        assert!(json.trim_start().starts_with('['));
        let text = report_with_format(&reports, OutputFormat::Text, false).unwrap();
        assert!(text.contains("Name: OrderService"));
    }
}
