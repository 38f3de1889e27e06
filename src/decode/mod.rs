//! Tolerant response-body decoding.
//!
//! Hosts emit either a single JSON document or a line-delimited feed on the
//! same family of endpoints, so decoding is strict-then-lenient and never
//! errors: anything unparseable is simply "no data".

use serde_json::Value;

/// Decode a raw response body.
///
/// Tries a strict single-document parse first. Failing that, splits the text
/// into non-empty trimmed lines (only when there is more than one) and
/// parses each line independently, discarding lines that don't parse. The
/// surviving lines come back as one array value.
#[must_use]
pub fn decode_body(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() <= 1 {
        return None;
    }
    let parsed: Vec<Value> = lines
        .into_iter()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(Value::Array(parsed))
    }
}
