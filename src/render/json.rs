//! JSON report rendering.

use crate::error::{Error, Result};
use crate::model::Extraction;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an extraction (text, tables, diagnostics, stats) to JSON.
pub fn to_json(extraction: &Extraction, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(extraction),
        JsonFormat::Compact => serde_json::to_string(extraction),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
