use serde::{Deserialize, Serialize};

/// How a model wants a resource rendered before indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformTarget {
    /// Repository-side transform endpoint appended to the resource path.
    /// `None` means a direct content-negotiated fetch.
    pub endpoint: Option<String>,
    /// Whether the rendered payload must be a non-empty node graph.
    pub expect_graph: bool,
}

impl TransformTarget {
    pub fn direct(expect_graph: bool) -> Self {
        Self { endpoint: None, expect_graph }
    }

    pub fn endpoint(endpoint: impl Into<String>, expect_graph: bool) -> Self {
        Self { endpoint: Some(endpoint.into()), expect_graph }
    }

    /// Fetch-cache key: models sharing an endpoint share one fetch.
    pub fn cache_key(&self) -> &str {
        self.endpoint.as_deref().unwrap_or("")
    }
}

/// A rendered representation fetched from the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    /// Parsed JSON body. `Null` on non-success or empty bodies.
    pub body: serde_json::Value,
    /// The URL that produced the payload, kept for provenance.
    pub url: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
