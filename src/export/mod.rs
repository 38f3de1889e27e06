//! JSON Lines export encoding.

use chrono::Local;
use serde_json::Value;

use crate::core::PagetapError;

/// A fully encoded export, ready for whatever save facility the platform
/// offers. Writing it to disk is the embedder's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub content: String,
}

/// Encode records as JSON Lines: one self-contained document per line,
/// newline-separated, no enclosing brackets.
///
/// # Errors
///
/// Returns an error if a record fails to serialize.
pub fn to_jsonl(records: &[Value]) -> Result<String, PagetapError> {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        lines.push(serde_json::to_string(record)?);
    }
    Ok(lines.join("\n"))
}

/// `<prefix>-<YYYYMMDD-HHMMSS local-clock>.<ext>`
#[must_use]
pub fn export_filename(prefix: &str, ext: &str) -> String {
    format!("{prefix}-{}.{ext}", Local::now().format("%Y%m%d-%H%M%S"))
}
