/// External registry of workflows bound to repository paths.
pub trait WorkflowRegistry: Send + Sync {
    fn workflows_for(&self, path: &str) -> Vec<String>;
}
