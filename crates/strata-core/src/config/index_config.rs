use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Which index sink strategy the engine writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Talk to the search index directly.
    Direct,
    /// Write to the local outbox for a downstream loader.
    Store,
}

/// Search index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub mode: IndexMode,
    /// Index REST base URL (direct mode only).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra indices holding a model's documents, keyed by index name, as
    /// left behind by `write-index` recrawls in earlier runs.
    pub write_indices: BTreeMap<String, String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            mode: IndexMode::Direct,
            base_url: defaults::DEFAULT_INDEX_URL.to_string(),
            timeout_secs: defaults::DEFAULT_HTTP_TIMEOUT_SECS,
            write_indices: BTreeMap::new(),
        }
    }
}
