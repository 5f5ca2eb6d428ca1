//! Subtree invalidation when a resource becomes inaccessible.

use std::collections::HashSet;
use std::sync::Arc;

use strata_core::models::{IndexedDocument, RemoveResult};
use strata_core::paths::owning_root;
use strata_core::traits::{IndexSink, StatusLedger};
use strata_core::{Event, StatusAction, StatusRecord, StrataResult};
use strata_observability::events;

/// Outcome of one invalidation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    /// The cleaned path the cascade ran from.
    pub root: String,
    /// Per-model results of removing the root itself.
    pub root_removed: Vec<RemoveResult>,
    /// Descendants removed from the index.
    pub removed: usize,
    /// Descendants whose removal failed.
    pub failed: usize,
}

pub struct CascadeInvalidator {
    sink: Arc<dyn IndexSink>,
    ledger: Arc<dyn StatusLedger>,
}

impl CascadeInvalidator {
    pub fn new(sink: Arc<dyn IndexSink>, ledger: Arc<dyn StatusLedger>) -> Self {
        Self { sink, ledger }
    }

    /// Remove `path` (or the root owning it, for a reserved sub-resource)
    /// and every indexed descendant, writing an `ignored` row per
    /// descendant. One failed descendant does not stop the rest; ledger
    /// failures propagate.
    pub async fn invalidate(&self, path: &str, event: &Event) -> StrataResult<CascadeReport> {
        let root = owning_root(path).to_string();
        let mut report = CascadeReport {
            root: root.clone(),
            ..Default::default()
        };

        match self.sink.remove(&root).await {
            Ok(results) => report.root_removed = results,
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                tracing::warn!(path = %root, error = %e, "failed to remove inaccessible root");
            }
        }

        let descendants = self.sink.find_descendants(&root).await?;
        let message = format!("parent {root} became inaccessible");

        let mut seen: HashSet<&str> = HashSet::new();
        for doc in &descendants {
            if !seen.insert(doc.id.as_str()) {
                continue;
            }
            match self.sink.remove(&doc.id).await {
                Ok(results) => {
                    report.removed += 1;
                    for model in models_for(&doc.id, &descendants) {
                        let response = results
                            .iter()
                            .find(|r| r.model == model)
                            .map(|r| r.response.clone())
                            .unwrap_or_default();
                        let record = descendant_record(event, &doc.id, model)
                            .with_message(&message)
                            .with_source(self.sink.channel())
                            .with_response(response);
                        self.ledger.record_status(&record).await?;
                    }
                }
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        path = %doc.id,
                        root = %root,
                        error = %e,
                        "failed to invalidate descendant"
                    );
                }
            }
        }

        events::cascade_invalidated(&root, report.removed, report.failed);
        Ok(report)
    }
}

fn models_for<'a>(id: &str, docs: &'a [IndexedDocument]) -> Vec<&'a str> {
    let mut models: Vec<&str> = Vec::new();
    for doc in docs.iter().filter(|d| d.id == id) {
        if !models.contains(&doc.model.as_str()) {
            models.push(&doc.model);
        }
    }
    models
}

fn descendant_record(event: &Event, path: &str, model: &str) -> StatusRecord {
    let mut record = StatusRecord::for_event(event, model, StatusAction::Ignored);
    record.path = path.to_string();
    record.container_types.clear();
    record
}
