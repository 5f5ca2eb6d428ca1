//! Shared test support for Strata: JSON-LD fixture loading and in-memory
//! fakes for the repository and index collaborators.

mod fakes;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub use fakes::{FakeRepository, RecordingIndexSink, StaticWorkflows, Upsert};

/// Base URL the fixture graphs are written against.
pub const FIXTURE_BASE_URL: &str = "http://localhost:8080/rest";

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Absolute repository URL for a canonical path.
pub fn iri(path: &str) -> String {
    format!("{FIXTURE_BASE_URL}{path}")
}

/// A minimal metadata graph for `path`: its types plus `ldp:contains`
/// links to `children`.
pub fn container_graph(path: &str, types: &[&str], children: &[&str]) -> serde_json::Value {
    let contains: Vec<serde_json::Value> = children
        .iter()
        .map(|c| serde_json::json!({ "@id": iri(c) }))
        .collect();
    serde_json::json!({
        "@id": iri(path),
        "@graph": [{
            "@id": iri(path),
            "@type": types,
            "http://www.w3.org/ns/ldp#contains": contains,
        }]
    })
}
