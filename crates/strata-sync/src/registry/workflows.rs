use strata_core::config::WorkflowBinding;
use strata_core::paths::is_descendant;
use strata_core::traits::WorkflowRegistry;

/// Workflow bindings by path prefix, from config.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredWorkflows {
    bindings: Vec<WorkflowBinding>,
}

impl ConfiguredWorkflows {
    pub fn new(bindings: Vec<WorkflowBinding>) -> Self {
        Self { bindings }
    }
}

impl WorkflowRegistry for ConfiguredWorkflows {
    fn workflows_for(&self, path: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for binding in &self.bindings {
            let prefix = binding.path_prefix.trim_end_matches('/');
            let bound = prefix.is_empty() || path == prefix || is_descendant(path, prefix);
            if bound && !names.contains(&binding.name) {
                names.push(binding.name.clone());
            }
        }
        names
    }
}
