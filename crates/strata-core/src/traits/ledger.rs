use async_trait::async_trait;

use crate::errors::StrataResult;
use crate::models::{StatusAction, StatusRecord};

/// Durable audit table of reconciliation outcomes, keyed by `(path, model)`.
#[async_trait]
pub trait StatusLedger: Send + Sync {
    /// Upsert by `(path, model)`.
    async fn record_status(&self, record: &StatusRecord) -> StrataResult<()>;

    /// Delete rows for `path` whose model is not in `keep_models`.
    /// Returns the number of rows deleted.
    async fn prune_status(&self, path: &str, keep_models: &[String]) -> StrataResult<usize>;

    /// All rows for a path.
    async fn status_for(&self, path: &str) -> StrataResult<Vec<StatusRecord>>;

    /// Most recently written rows with the given action.
    async fn statuses_by_action(
        &self,
        action: StatusAction,
        limit: usize,
    ) -> StrataResult<Vec<StatusRecord>>;
}
