use crate::models::TransformTarget;

/// A named target model that may bind to repository resources.
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this model applies to the resource.
    fn matches(&self, path: &str, types: &[String], workflow_types: &[String]) -> bool;

    /// How to render resources for this model.
    fn transform_target(&self) -> TransformTarget;

    /// Whether this model syncs over the given sink channel.
    fn sync_capable(&self, channel: &str) -> bool;
}
