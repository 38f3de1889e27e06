//! The deduplicating collector: the canonical accumulated dataset.
//!
//! Dedup is the correctness backstop for the report channel's weak delivery
//! guarantees (duplicates, reordering), so acceptance must be idempotent and
//! commutative with respect to arrival order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::{CaptureConfig, DEFAULT_ID_CONTAINERS, DEFAULT_ID_FIELD};

/// Collector behind a single-writer lock, shared between the payload pump
/// and the scroll driver.
pub type SharedCollector = Arc<RwLock<Collector>>;

/// Accumulates unique records in first-seen order.
///
/// Invariant: `ordered.len() == by_id.len() + seen_hashes.len()`; entries
/// are never removed or reordered except by [`Collector::clear`].
#[derive(Debug)]
pub struct Collector {
    by_id: HashMap<String, Value>,
    seen_hashes: HashSet<String>,
    ordered: Vec<Value>,
    id_field: String,
    id_containers: Vec<String>,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            seen_hashes: HashSet::new(),
            ordered: Vec::new(),
            id_field: DEFAULT_ID_FIELD.into(),
            id_containers: DEFAULT_ID_CONTAINERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Collector {
    /// Create a collector using the configured identity conventions.
    #[must_use]
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            id_field: config.id_field().to_string(),
            id_containers: config.id_containers().to_vec(),
            ..Self::default()
        }
    }

    /// Accept one record. Returns whether it was newly accepted.
    ///
    /// Non-objects are rejected outright. A record whose identity is already
    /// known is rejected without content comparison: first write wins, even
    /// when the later record's content differs.
    pub fn push(&mut self, record: Value) -> bool {
        if !record.is_object() {
            return false;
        }
        let accepted = match self.identity_of(&record) {
            Some(id) => {
                if self.by_id.contains_key(&id) {
                    false
                } else {
                    self.by_id.insert(id, record.clone());
                    self.ordered.push(record);
                    true
                }
            }
            None => {
                if self.seen_hashes.insert(content_hash(&record)) {
                    self.ordered.push(record);
                    true
                } else {
                    false
                }
            }
        };
        debug_assert_eq!(self.ordered.len(), self.by_id.len() + self.seen_hashes.len());
        accepted
    }

    /// Accept a sequence or a single object; anything else yields 0.
    /// Returns the number of newly accepted records.
    pub fn push_many(&mut self, value: &Value) -> usize {
        match value {
            Value::Array(records) => records
                .iter()
                .filter(|record| self.push((*record).clone()))
                .count(),
            Value::Object(_) => usize::from(self.push(value.clone())),
            _ => 0,
        }
    }

    /// Drop everything, atomically. The only removing operation.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.seen_hashes.clear();
        self.ordered.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Accepted records in first-seen order.
    #[must_use]
    pub fn ordered(&self) -> &[Value] {
        &self.ordered
    }

    /// Owned copy of the accumulated records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.ordered.clone()
    }

    /// How many distinct identities are registered (id-keyed plus hashed).
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.by_id.len() + self.seen_hashes.len()
    }

    /// Whether an id-keyed record with this identity has been accepted.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    fn identity_of(&self, record: &Value) -> Option<String> {
        if let Some(id) = record.get(&self.id_field).and_then(id_text) {
            return Some(id);
        }
        for container in &self.id_containers {
            if let Some(id) = record
                .get(container.as_str())
                .and_then(|sub| sub.get(&self.id_field))
                .and_then(id_text)
            {
                return Some(id);
            }
        }
        None
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Low-collision polynomial hash over the serialized record.
///
/// A record that refuses to serialize still gets collected under a random
/// identity: an occasional duplicate beats a dropped record.
fn content_hash(record: &Value) -> String {
    match serde_json::to_string(record) {
        Ok(serialized) => {
            let mut h: u32 = 0;
            for byte in serialized.bytes() {
                h = h.wrapping_mul(31).wrapping_add(u32::from(byte));
            }
            h.to_string()
        }
        Err(_) => uuid::Uuid::new_v4().to_string(),
    }
}
