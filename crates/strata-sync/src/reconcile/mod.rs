//! The per-event reconciliation pipeline.
//!
//! One call handles one dequeued event: access-control requeue, type
//! resolution, workflow annotation, model matching and pruning, then each
//! matched model in turn. Model outcomes land in the status ledger; only
//! queue/ledger failures escape as errors.

mod fetch_cache;
pub mod payload;


use serde_json::{json, Value};

use strata_core::config::EngineConfig;
use strata_core::constants::{BINARY_TYPES, MSG_NO_MODEL, MSG_RAW_BINARY};
use strata_core::models::RemoveResult;
use strata_core::paths::{expand_iri, is_acl, is_metadata_companion, is_reserved, owning_root};
use strata_core::traits::Model;
use strata_core::{Event, StatusAction, StatusRecord, StrataError, StrataResult};
use strata_observability::events;

use crate::cascade::{CascadeInvalidator, CascadeReport};
use crate::SyncContext;

pub use fetch_cache::FetchCache;

/// What one reconciliation call did.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub path: String,
    pub event_id: String,
    /// Types the pipeline ran with, after resolution.
    pub container_types: Vec<String>,
    /// Root requeued because its access control changed.
    pub acl_requeued: Option<String>,
    /// `(model, action)` per ledger row written for the path.
    pub outcomes: Vec<(String, StatusAction)>,
    pub cascade: Option<CascadeReport>,
}

impl ReconcileReport {
    pub fn action_for(&self, model: &str) -> Option<StatusAction> {
        self.outcomes
            .iter()
            .find(|(m, _)| m == model)
            .map(|(_, action)| *action)
    }
}

/// State shared by every model of one call.
#[derive(Default)]
struct CallState {
    fetches: FetchCache,
    removed: Option<Vec<RemoveResult>>,
    cascade: Option<CascadeReport>,
}

pub struct Reconciler {
    ctx: SyncContext,
    cascade: CascadeInvalidator,
    ignore_types: Vec<String>,
    acl_types: Vec<String>,
}

impl Reconciler {
    pub fn new(ctx: SyncContext, config: &EngineConfig) -> Self {
        let cascade = CascadeInvalidator::new(ctx.sink.clone(), ctx.ledger.clone());
        Self {
            ctx,
            cascade,
            ignore_types: config.ignore_types.iter().map(|t| expand_iri(t)).collect(),
            acl_types: config.acl_types.iter().map(|t| expand_iri(t)).collect(),
        }
    }

    pub fn channel(&self) -> &str {
        self.ctx.sink.channel()
    }

    /// Run the pipeline for one event. Errors are transient only.
    pub async fn reconcile(&self, event: &Event) -> StrataResult<ReconcileReport> {
        let mut report = ReconcileReport {
            path: event.path.clone(),
            event_id: event.event_id.clone(),
            ..Default::default()
        };

        if self.is_acl_event(event) {
            report.acl_requeued = self.requeue_acl_root(event).await?;
        }

        let mut resolved = event.clone();
        if resolved.container_types.is_empty() {
            resolved.container_types = self.resolve_types(&event.path).await?;
        }
        report.container_types = resolved.container_types.clone();

        let workflows = self.ctx.workflows.workflows_for(&event.path);
        let channel = self.channel().to_string();
        let models = self.ctx.models.matching(
            &event.path,
            &resolved.container_types,
            &workflows,
            &channel,
        );

        if models.is_empty() {
            let record = StatusRecord::for_event(&resolved, "", StatusAction::Ignored)
                .with_message(MSG_NO_MODEL)
                .with_workflows(&workflows)
                .with_source(&channel);
            self.ctx.ledger.record_status(&record).await?;
            self.ctx.ledger.prune_status(&event.path, &[String::new()]).await?;
            events::event_ignored(&event.path, "", MSG_NO_MODEL);
            report.outcomes.push((String::new(), StatusAction::Ignored));
            return Ok(report);
        }

        let keep: Vec<String> = models.iter().map(|m| m.name().to_string()).collect();
        let pruned = self.ctx.ledger.prune_status(&event.path, &keep).await?;
        if pruned > 0 {
            tracing::debug!(path = %event.path, pruned, "pruned stale status rows");
        }

        let mut state = CallState::default();
        for model in &models {
            let record = match self.reconcile_model(&resolved, model.as_ref(), &mut state).await {
                Ok(record) => record,
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => self.error_record(&resolved, model.name(), &e),
            };
            let record = record.with_workflows(&workflows).with_source(&channel);
            self.ctx.ledger.record_status(&record).await?;
            log_outcome(&record);
            report.outcomes.push((record.model.clone(), record.action));
        }
        report.cascade = state.cascade;
        Ok(report)
    }

    /// Record an `error` row for a failure that escaped the pipeline
    /// before any model ran.
    pub async fn record_failure(&self, event: &Event, error: &StrataError) -> StrataResult<()> {
        let record = self
            .error_record(event, "", error)
            .with_source(self.channel());
        self.ctx.ledger.record_status(&record).await?;
        log_outcome(&record);
        Ok(())
    }

    fn is_acl_event(&self, event: &Event) -> bool {
        is_acl(&event.path)
            || event
                .container_types
                .iter()
                .any(|t| self.acl_types.contains(&expand_iri(t)))
    }

    async fn requeue_acl_root(&self, event: &Event) -> StrataResult<Option<String>> {
        let root = owning_root(&event.path).to_string();
        if root == event.path {
            return Ok(None);
        }
        let types = match self.ctx.repository.head(&root).await {
            Ok(Some(types)) => types,
            Ok(None) => Vec::new(),
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                tracing::warn!(path = %root, error = %e, "could not resolve root types for acl requeue");
                Vec::new()
            }
        };
        self.ctx.queue.enqueue(&Event::reindex(root.clone(), types)).await?;
        events::acl_requeued(&event.path, &root);
        Ok(Some(root))
    }

    /// HEAD probe, then the last types recorded in the ledger, then nothing.
    async fn resolve_types(&self, path: &str) -> StrataResult<Vec<String>> {
        match self.ctx.repository.head(path).await {
            Ok(Some(types)) if !types.is_empty() => return Ok(types),
            Ok(_) => {}
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => tracing::debug!(path = %path, error = %e, "type probe failed"),
        }
        let known = self.ctx.ledger.status_for(path).await?;
        Ok(known
            .into_iter()
            .find(|r| !r.container_types.is_empty())
            .map(|r| r.container_types)
            .unwrap_or_default())
    }

    async fn reconcile_model(
        &self,
        event: &Event,
        model: &dyn Model,
        state: &mut CallState,
    ) -> StrataResult<StatusRecord> {
        let name = model.name();
        let path = event.path.as_str();

        if event.is_delete() {
            let response = self.remove_once(path, name, state).await?;
            return Ok(StatusRecord::for_event(event, name, StatusAction::Deleted)
                .with_response(response));
        }

        if is_binary(&event.container_types) && !is_metadata_companion(path) {
            return Ok(StatusRecord::for_event(event, name, StatusAction::Ignored)
                .with_message(MSG_RAW_BINARY));
        }

        if let Some(ignored) = self.ignored_type(&event.container_types) {
            let mut record = StatusRecord::for_event(event, name, StatusAction::Ignored)
                .with_message(format!("ignored type {ignored}"));
            if !is_reserved(path) {
                record.db_response = self.remove_once(path, name, state).await?;
            }
            return Ok(record);
        }

        let target = model.transform_target();
        let fetched = state
            .fetches
            .get_or_fetch(self.ctx.repository.as_ref(), path, &target)
            .await?
            .clone();

        if !fetched.is_success() {
            let cascade = self.cascade_once(event, state).await?;
            return Ok(StatusRecord::for_event(event, name, StatusAction::Ignored)
                .with_message(format!("resource inaccessible (HTTP {})", fetched.status))
                .with_transform_service(&fetched.url)
                .with_response(json!({
                    "removed": cascade.removed,
                    "failed": cascade.failed,
                })));
        }

        if target.expect_graph {
            if let Err(reason) = payload::validate_graph(&fetched.body) {
                let response = self.remove_once(path, name, state).await?;
                return Ok(StatusRecord::for_event(event, name, StatusAction::Ignored)
                    .with_message(reason)
                    .with_transform_service(&fetched.url)
                    .with_response(response));
            }
        }

        let document = payload::stamp_provenance(fetched.body, event);
        let response = self
            .ctx
            .sink
            .upsert(name, path, &document, event.write_index.as_deref())
            .await?;
        Ok(StatusRecord::for_event(event, name, StatusAction::Updated)
            .with_transform_service(&fetched.url)
            .with_response(response))
    }

    /// Remove the path from the index at most once per call and return the
    /// response for `model`.
    async fn remove_once(
        &self,
        path: &str,
        model: &str,
        state: &mut CallState,
    ) -> StrataResult<Value> {
        if state.removed.is_none() {
            state.removed = Some(self.ctx.sink.remove(path).await?);
        }
        Ok(response_for(state.removed.as_deref().unwrap_or_default(), model))
    }

    async fn cascade_once(&self, event: &Event, state: &mut CallState) -> StrataResult<CascadeReport> {
        if let Some(report) = &state.cascade {
            return Ok(report.clone());
        }
        let report = self.cascade.invalidate(&event.path, event).await?;
        if report.root == event.path && state.removed.is_none() {
            state.removed = Some(report.root_removed.clone());
        }
        state.cascade = Some(report.clone());
        Ok(report)
    }

    fn ignored_type<'a>(&self, types: &'a [String]) -> Option<&'a str> {
        types
            .iter()
            .find(|t| self.ignore_types.contains(&expand_iri(t)))
            .map(String::as_str)
    }

    fn error_record(&self, event: &Event, model: &str, error: &StrataError) -> StatusRecord {
        StatusRecord::for_event(event, model, StatusAction::Error).with_message(error.chain())
    }
}

fn is_binary(types: &[String]) -> bool {
    types
        .iter()
        .any(|t| BINARY_TYPES.contains(&expand_iri(t).as_str()))
}

fn response_for(results: &[RemoveResult], model: &str) -> Value {
    results
        .iter()
        .find(|r| r.model == model)
        .map(|r| r.response.clone())
        .unwrap_or_else(|| json!({ "result": "not_indexed" }))
}

fn log_outcome(record: &StatusRecord) {
    match record.action {
        StatusAction::Updated | StatusAction::Deleted => events::event_reconciled(
            &record.path,
            &record.model,
            record.action.as_str(),
            &record.event_id,
        ),
        StatusAction::Ignored => events::event_ignored(&record.path, &record.model, &record.message),
        StatusAction::Error => events::event_failed(&record.path, &record.model, &record.message),
    }
}
