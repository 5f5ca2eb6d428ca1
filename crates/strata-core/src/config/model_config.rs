use serde::{Deserialize, Serialize};

/// A target model declared in config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    /// Matches when the resource carries any of these types.
    /// Compact IRIs (`pcdm:Object`) are expanded.
    pub types: Vec<String>,
    /// Optional path prefix the resource must live under.
    pub path_prefix: Option<String>,
    /// Optional workflow names; when set, at least one must be bound.
    pub workflows: Vec<String>,
    /// Repository-side transform endpoint, e.g. `fcr:transform/solr`.
    pub transform_endpoint: Option<String>,
    /// Require a non-empty `@graph` payload.
    pub expect_graph: bool,
    /// Sink channels this model syncs over. Empty means every channel.
    pub channels: Vec<String>,
}

/// Binds a workflow name to every path under a prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowBinding {
    pub name: String,
    pub path_prefix: String,
}
