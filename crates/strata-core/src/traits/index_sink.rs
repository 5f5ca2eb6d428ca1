use async_trait::async_trait;

use crate::errors::StrataResult;
use crate::models::{IndexedDocument, RemoveResult};

/// Where reconciled documents go. Either a direct index client or a
/// store-mediated outbox.
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Sync channel name. Models opt in per channel, and the name is
    /// recorded as the `source` of every status row.
    fn channel(&self) -> &str;

    /// Index a document for a model under its canonical path.
    /// Returns the sink's response.
    async fn upsert(
        &self,
        model: &str,
        path: &str,
        document: &serde_json::Value,
        write_index: Option<&str>,
    ) -> StrataResult<serde_json::Value>;

    /// Remove a path from every model's index.
    async fn remove(&self, path: &str) -> StrataResult<Vec<RemoveResult>>;

    /// Every indexed document strictly below `path`.
    async fn find_descendants(&self, path: &str) -> StrataResult<Vec<IndexedDocument>>;
}
