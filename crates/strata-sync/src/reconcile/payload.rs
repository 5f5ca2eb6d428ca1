//! Document checks and provenance stamping.

use serde_json::{json, Map, Value};

use strata_core::constants::{JSONLD_GRAPH, JSONLD_ID, PROVENANCE_KEY};
use strata_core::Event;

/// A graph payload needs an `@id` and a non-empty `@graph`.
pub fn validate_graph(body: &Value) -> Result<(), String> {
    let Some(map) = body.as_object() else {
        return Err("expected a JSON-LD object".to_string());
    };
    if !map.get(JSONLD_ID).is_some_and(Value::is_string) {
        return Err(format!("graph payload has no {JSONLD_ID}"));
    }
    match map.get(JSONLD_GRAPH).and_then(Value::as_array) {
        Some(nodes) if !nodes.is_empty() => Ok(()),
        _ => Err(format!("graph payload has an empty {JSONLD_GRAPH}")),
    }
}

/// The provenance block written under [`PROVENANCE_KEY`].
pub fn provenance(event: &Event) -> Value {
    json!({
        "event_id": event.event_id,
        "timestamp": event.timestamp.to_rfc3339(),
        "update_types": event.update_types.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
    })
}

/// Stamp every `@graph` node, or the document itself when there is no
/// graph. Non-object payloads are wrapped first.
pub fn stamp_provenance(body: Value, event: &Event) -> Value {
    let stamp = provenance(event);
    let mut document = match body {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("document".to_string(), other);
            map
        }
    };

    match document.get_mut(JSONLD_GRAPH).and_then(Value::as_array_mut) {
        Some(nodes) => {
            for node in nodes.iter_mut().filter_map(Value::as_object_mut) {
                node.insert(PROVENANCE_KEY.to_string(), stamp.clone());
            }
        }
        None => {
            document.insert(PROVENANCE_KEY.to_string(), stamp);
        }
    }
    Value::Object(document)
}
