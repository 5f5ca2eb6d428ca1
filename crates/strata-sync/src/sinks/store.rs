use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use strata_core::models::{IndexedDocument, RemoveResult};
use strata_core::traits::IndexSink;
use strata_core::StrataResult;
use strata_storage::StorageEngine;

/// Store-mediated sink: writes go to the `index_outbox` table for a
/// downstream loader, and `indexed_documents` answers descendant lookups.
pub struct StoreIndexSink {
    storage: Arc<StorageEngine>,
}

impl StoreIndexSink {
    pub const CHANNEL: &'static str = "store";

    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl IndexSink for StoreIndexSink {
    fn channel(&self) -> &str {
        Self::CHANNEL
    }

    async fn upsert(
        &self,
        model: &str,
        path: &str,
        document: &Value,
        write_index: Option<&str>,
    ) -> StrataResult<Value> {
        let outbox_id = self
            .storage
            .outbox_upsert(model, path, write_index, document)
            .await?;
        Ok(json!({ "result": "queued", "outbox_id": outbox_id }))
    }

    async fn remove(&self, path: &str) -> StrataResult<Vec<RemoveResult>> {
        let queued = self.storage.outbox_remove(path).await?;
        Ok(queued
            .into_iter()
            .map(|(model, outbox_id)| RemoveResult {
                model,
                response: json!({ "result": "queued", "outbox_id": outbox_id }),
            })
            .collect())
    }

    async fn find_descendants(&self, path: &str) -> StrataResult<Vec<IndexedDocument>> {
        self.storage.indexed_descendants(path).await
    }
}
