//! Configuration, loaded from TOML. Every section falls back to defaults.

pub mod crawl_config;
pub mod defaults;
pub mod engine_config;
pub mod index_config;
pub mod model_config;
pub mod observability_config;
pub mod repository_config;
pub mod storage_config;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, StrataResult};

pub use crawl_config::CrawlConfig;
pub use engine_config::EngineConfig;
pub use index_config::{IndexConfig, IndexMode};
pub use model_config::{ModelConfig, WorkflowBinding};
pub use observability_config::ObservabilityConfig;
pub use repository_config::RepositoryConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub storage: StorageConfig,
    pub repository: RepositoryConfig,
    pub index: IndexConfig,
    pub engine: EngineConfig,
    pub crawl: CrawlConfig,
    pub observability: ObservabilityConfig,
    pub models: Vec<ModelConfig>,
    pub workflows: Vec<WorkflowBinding>,
}

impl StrataConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> StrataResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(raw: &str) -> StrataResult<Self> {
        let config: StrataConfig = toml::from_str(raw).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> StrataResult<()> {
        if self.engine.poll_interval_secs == 0 {
            return Err(invalid("engine.poll_interval_secs", "must be at least 1"));
        }
        if self.engine.error_backoff_secs == 0 {
            return Err(invalid("engine.error_backoff_secs", "must be at least 1"));
        }
        if self.repository.timeout_secs == 0 || self.index.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if model.name.is_empty() {
                return Err(invalid("models.name", "must not be empty"));
            }
            if !seen.insert(model.name.as_str()) {
                return Err(invalid("models.name", &format!("duplicate model {}", model.name)));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> crate::errors::StrataError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
