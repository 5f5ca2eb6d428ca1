//! Model and workflow registries.

mod configured_model;
mod workflows;

use std::sync::Arc;

use strata_core::config::ModelConfig;
use strata_core::traits::Model;

pub use configured_model::ConfiguredModel;
pub use workflows::ConfiguredWorkflows;

/// The set of target models the engine reconciles against.
#[derive(Default)]
pub struct ModelRegistry {
    models: Vec<Arc<dyn Model>>,
}

impl ModelRegistry {
    pub fn new(models: Vec<Arc<dyn Model>>) -> Self {
        Self { models }
    }

    /// Build one [`ConfiguredModel`] per config entry.
    pub fn from_config(configs: &[ModelConfig]) -> Self {
        Self::new(
            configs
                .iter()
                .map(|c| Arc::new(ConfiguredModel::from_config(c)) as Arc<dyn Model>)
                .collect(),
        )
    }

    /// Models that sync over `channel` and bind to the resource, in
    /// registration order.
    pub fn matching(
        &self,
        path: &str,
        types: &[String],
        workflow_types: &[String],
        channel: &str,
    ) -> Vec<Arc<dyn Model>> {
        self.models
            .iter()
            .filter(|m| m.sync_capable(channel) && m.matches(path, types, workflow_types))
            .cloned()
            .collect()
    }

    /// Names of every model syncing over `channel`.
    pub fn names_for_channel(&self, channel: &str) -> Vec<String> {
        self.models
            .iter()
            .filter(|m| m.sync_capable(channel))
            .map(|m| m.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.models.iter().map(|m| m.name()))
            .finish()
    }
}
