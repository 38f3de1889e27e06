use serde_json::Value;

/// Strategy A: the value is already a sequence.
pub(crate) fn try_bare_sequence(value: &Value) -> Option<Vec<Value>> {
    value.as_array().map(Vec::clone)
}

/// Strategy B: a conventional wrapper key holds the sequence.
pub(crate) fn try_wrapper_keys(value: &Value, keys: &[String]) -> Option<Vec<Value>> {
    for key in keys {
        if let Some(records) = value.get(key.as_str()).and_then(Value::as_array) {
            return Some(records.clone());
        }
    }
    None
}

/// Strategy C: graph-query pagination, `data.<key>.edges[].node`.
///
/// The first property of `data` carrying an `edges` array wins; each edge
/// maps to its `node`, or to the edge itself when no node is present. Empty
/// results don't count as a match.
pub(crate) fn try_edge_nodes(value: &Value) -> Option<Vec<Value>> {
    let data = value.get("data")?.as_object()?;
    for edge_owner in data.values() {
        if let Some(edges) = edge_owner.get("edges").and_then(Value::as_array) {
            let nodes: Vec<Value> = edges
                .iter()
                .filter(|edge| !edge.is_null())
                .map(|edge| {
                    edge.get("node")
                        .filter(|node| !node.is_null())
                        .unwrap_or(edge)
                        .clone()
                })
                .collect();
            if !nodes.is_empty() {
                return Some(nodes);
            }
        }
    }
    None
}
