use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::WEBAC_ACL;

/// Reconciliation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sleep between polls when the queue is empty.
    pub poll_interval_secs: u64,
    /// Sleep after a queue/ledger failure before retrying the same event.
    pub error_backoff_secs: u64,
    /// Resources carrying any of these types are never indexed.
    pub ignore_types: Vec<String>,
    /// Types marking an access-control resource.
    pub acl_types: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::DEFAULT_POLL_INTERVAL_SECS,
            error_backoff_secs: defaults::DEFAULT_ERROR_BACKOFF_SECS,
            ignore_types: Vec::new(),
            acl_types: vec![WEBAC_ACL.to_string()],
        }
    }
}
