use serde::{Deserialize, Serialize};

use super::defaults;

/// Content repository client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository REST base URL. Stripped from incoming identifiers.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Credentials for direct (superuser) reads.
    pub direct_user: Option<String>,
    pub direct_password: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_REPOSITORY_URL.to_string(),
            timeout_secs: defaults::DEFAULT_HTTP_TIMEOUT_SECS,
            direct_user: None,
            direct_password: None,
        }
    }
}
