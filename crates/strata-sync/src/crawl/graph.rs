//! Read-only helpers over JSON-LD graph fragments.

use serde_json::Value;

use strata_core::constants::{JSONLD_GRAPH, JSONLD_ID, JSONLD_TYPE};
use strata_core::paths::{canonicalize, expand_iri};

/// Every node object in a fragment: the `@graph` members, the members of
/// a top-level array, or the object itself.
pub fn nodes(graph: &Value) -> Vec<&Value> {
    match graph {
        Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
        Value::Object(map) => match map.get(JSONLD_GRAPH).and_then(Value::as_array) {
            Some(items) => items.iter().filter(|v| v.is_object()).collect(),
            None => vec![graph],
        },
        _ => Vec::new(),
    }
}

pub fn node_id(node: &Value) -> Option<&str> {
    node.get(JSONLD_ID).and_then(Value::as_str)
}

/// The node describing `path`.
pub fn find_node<'a>(graph: &'a Value, path: &str, base_url: &str) -> Option<&'a Value> {
    nodes(graph)
        .into_iter()
        .find(|node| node_id(node).is_some_and(|id| canonicalize(id, base_url) == path))
}

/// Expanded `@type` values of one node.
pub fn types_of(node: &Value) -> Vec<String> {
    let mut out = Vec::new();
    push_strings(node.get(JSONLD_TYPE), &mut out);
    out.iter().map(|t| expand_iri(t)).collect()
}

/// `@type` merged across every node in the fragment, first-seen order.
pub fn merged_types(graph: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for node in nodes(graph) {
        for t in types_of(node) {
            if !out.contains(&t) {
                out.push(t);
            }
        }
    }
    out
}

/// Targets of `relations` on `node`. Keys may be full or compact IRIs;
/// values may be strings, `{"@id": ..}` objects, or arrays of either.
pub fn related_ids(node: &Value, relations: &[String]) -> Vec<String> {
    let Some(map) = node.as_object() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (key, value) in map {
        if key.starts_with('@') || !relations.contains(&expand_iri(key)) {
            continue;
        }
        collect_ids(value, &mut out);
    }
    out
}

fn collect_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Object(_) => {
            if let Some(id) = node_id(value) {
                out.push(id.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_ids(v, out)),
        _ => {}
    }
}

fn push_strings(value: Option<&Value>, out: &mut Vec<String>) {
    match value {
        Some(Value::String(s)) => out.push(s.clone()),
        Some(Value::Array(items)) => {
            out.extend(items.iter().filter_map(Value::as_str).map(String::from))
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::constants::LDP_CONTAINS;

    const BASE: &str = "http://localhost:8080/rest";

    fn fragment() -> Value {
        json!({
            "@id": "http://localhost:8080/rest/a",
            "@graph": [
                {
                    "@id": "http://localhost:8080/rest/a",
                    "@type": ["ldp:Container", "pcdm:Object"],
                    "ldp:contains": [
                        {"@id": "http://localhost:8080/rest/a/b"},
                        "http://localhost:8080/rest/a/c"
                    ],
                    "http://pcdm.org/models#hasMember": {"@id": "http://localhost:8080/rest/m"}
                },
                {"@id": "http://localhost:8080/rest/a#hash", "@type": "pcdm:File"}
            ]
        })
    }

    #[test]
    fn finds_the_node_for_a_path() {
        let g = fragment();
        let node = find_node(&g, "/a", BASE).unwrap();
        assert_eq!(node_id(node), Some("http://localhost:8080/rest/a"));
        assert!(find_node(&g, "/zzz", BASE).is_none());
    }

    #[test]
    fn merges_types_across_the_fragment() {
        let types = merged_types(&fragment());
        assert_eq!(
            types,
            vec![
                "http://www.w3.org/ns/ldp#Container".to_string(),
                "http://pcdm.org/models#Object".to_string(),
                "http://pcdm.org/models#File".to_string(),
            ]
        );
    }

    #[test]
    fn follows_only_requested_relations() {
        let g = fragment();
        let node = find_node(&g, "/a", BASE).unwrap();
        let contained = related_ids(node, &[LDP_CONTAINS.to_string()]);
        assert_eq!(contained.len(), 2);
        let members = related_ids(node, &[expand_iri("pcdm:hasMember")]);
        assert_eq!(members, vec!["http://localhost:8080/rest/m".to_string()]);
    }
}
