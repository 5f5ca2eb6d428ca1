use strata_core::config::ModelConfig;
use strata_core::models::TransformTarget;
use strata_core::paths::{expand_iri, is_descendant};
use strata_core::traits::Model;

/// A model declared in config: binds by type, optional path prefix, and
/// optional workflow membership.
#[derive(Debug, Clone)]
pub struct ConfiguredModel {
    name: String,
    types: Vec<String>,
    path_prefix: Option<String>,
    workflows: Vec<String>,
    target: TransformTarget,
    channels: Vec<String>,
}

impl ConfiguredModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            name: config.name.clone(),
            types: config.types.iter().map(|t| expand_iri(t)).collect(),
            path_prefix: config
                .path_prefix
                .as_ref()
                .map(|p| p.trim_end_matches('/').to_string()),
            workflows: config.workflows.clone(),
            target: TransformTarget {
                endpoint: config.transform_endpoint.clone(),
                expect_graph: config.expect_graph,
            },
            channels: config.channels.clone(),
        }
    }

    fn matches_types(&self, types: &[String]) -> bool {
        self.types.is_empty()
            || types
                .iter()
                .any(|t| self.types.iter().any(|wanted| *wanted == expand_iri(t)))
    }

    fn matches_path(&self, path: &str) -> bool {
        match self.path_prefix.as_deref() {
            None | Some("") => true,
            Some(prefix) => path == prefix || is_descendant(path, prefix),
        }
    }

    fn matches_workflows(&self, workflow_types: &[String]) -> bool {
        self.workflows.is_empty() || workflow_types.iter().any(|w| self.workflows.contains(w))
    }
}

impl Model for ConfiguredModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, path: &str, types: &[String], workflow_types: &[String]) -> bool {
        self.matches_types(types) && self.matches_path(path) && self.matches_workflows(workflow_types)
    }

    fn transform_target(&self) -> TransformTarget {
        self.target.clone()
    }

    fn sync_capable(&self, channel: &str) -> bool {
        self.channels.is_empty() || self.channels.iter().any(|c| c == channel)
    }
}
