use serde::{Deserialize, Serialize};

use crate::constants::LDP_CONTAINS;

/// Bulk recrawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Standard containment relations, always traversed.
    pub containment: Vec<String>,
    /// Relations traversed on every crawl in addition to per-request `follow`.
    pub default_follow: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            containment: vec![LDP_CONTAINS.to_string()],
            default_follow: Vec::new(),
        }
    }
}
