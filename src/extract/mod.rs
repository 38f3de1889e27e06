//! Polymorphic record extraction from decoded values of unknown shape.
//!
//! The host's response schema is uncontrolled, so extraction is a closed set
//! of strategies tried in a fixed priority order, degrading to whole-object
//! wrapping rather than ever failing.

mod strategies;

use serde_json::Value;

/// Locate the record collection inside a decoded value.
///
/// Order, first match wins: bare array; an array under one of
/// `wrapper_keys`; the edge/node graph-pagination shape; and finally the
/// whole value as a single record.
#[must_use]
pub fn extract_records(value: &Value, wrapper_keys: &[String]) -> Vec<Value> {
    if let Some(records) = strategies::try_bare_sequence(value) {
        return records;
    }
    if let Some(records) = strategies::try_wrapper_keys(value, wrapper_keys) {
        return records;
    }
    if let Some(records) = strategies::try_edge_nodes(value) {
        return records;
    }
    vec![value.clone()]
}
