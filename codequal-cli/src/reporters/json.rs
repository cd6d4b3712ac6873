//! JSON reporter
//!
//! Outputs `[{ "path", "results": [...] }]` as pretty-printed JSON.

use crate::models::FileReport;
use anyhow::Result;
use serde::Serialize;

/// Render file reports as JSON
pub fn render(reports: &[FileReport]) -> Result<String> {
    to_pretty(reports)
}

/// Pretty JSON for any serializable value (used by `codequal metrics`)
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
