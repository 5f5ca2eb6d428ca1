//! End-to-end reconciliation through the polling engine: queue in, ledger
//! and index out.

use std::sync::Arc;

use serde_json::json;

use strata_core::config::{EngineConfig, ModelConfig};
use strata_core::constants::{
    FEDORA_BINARY, LDP_CONTAINER, MSG_NO_MODEL, MSG_RAW_BINARY, PROVENANCE_KEY, WEBAC_ACL,
};
use strata_core::traits::{EventQueue, StatusLedger};
use strata_core::{Event, StatusAction, UpdateType};
use strata_storage::StorageEngine;
use strata_sync::{ModelRegistry, PollOutcome, ReconcileReport, SyncContext, SyncEngine};
use test_fixtures::{load_fixture_value, FakeRepository, RecordingIndexSink, StaticWorkflows};

const PCDM_OBJECT: &str = "http://pcdm.org/models#Object";
const PCDM_COLLECTION: &str = "http://pcdm.org/models#Collection";
const PCDM_FILE: &str = "http://pcdm.org/models#File";
const HIDDEN: &str = "http://example.org/ns#Hidden";

struct Harness {
    storage: Arc<StorageEngine>,
    repo: Arc<FakeRepository>,
    sink: Arc<RecordingIndexSink>,
    engine: SyncEngine,
}

fn model(name: &str, types: &[&str]) -> ModelConfig {
    ModelConfig {
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

fn harness(repo: FakeRepository, sink: RecordingIndexSink, models: Vec<ModelConfig>) -> Harness {
    harness_with(repo, sink, models, StaticWorkflows::new(), EngineConfig::default())
}

fn harness_with(
    repo: FakeRepository,
    sink: RecordingIndexSink,
    models: Vec<ModelConfig>,
    workflows: StaticWorkflows,
    config: EngineConfig,
) -> Harness {
    let storage = Arc::new(StorageEngine::open_in_memory().expect("in-memory storage"));
    let repo = Arc::new(repo);
    let sink = Arc::new(sink);
    let ctx = SyncContext {
        queue: storage.clone(),
        ledger: storage.clone(),
        repository: repo.clone(),
        sink: sink.clone(),
        models: Arc::new(ModelRegistry::from_config(&models)),
        workflows: Arc::new(workflows),
    };
    Harness {
        storage,
        repo,
        sink,
        engine: SyncEngine::new(ctx, &config),
    }
}

impl Harness {
    async fn submit(&self, event: &Event) {
        self.storage.enqueue(event).await.expect("enqueue");
    }

    async fn process(&self) -> ReconcileReport {
        match self.engine.poll_once().await.expect("poll") {
            PollOutcome::Processed { report, acknowledged } => {
                assert!(acknowledged, "event should be acknowledged");
                report
            }
            PollOutcome::Idle => panic!("expected a pending event"),
        }
    }

    async fn rows(&self, path: &str) -> Vec<strata_core::StatusRecord> {
        self.storage.status_for(path).await.expect("status_for")
    }
}

fn update(path: &str, types: &[&str]) -> Event {
    Event::new(
        path,
        types.iter().map(|t| t.to_string()).collect(),
        vec![UpdateType::Update],
    )
}

// ─── Updates ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_produces_one_upsert_and_one_updated_row() {
    let repo = FakeRepository::new().with_document(
        "/items/42",
        200,
        load_fixture_value("graphs/item_transform.json"),
    );
    let mut objects = model("objects", &["pcdm:Object"]);
    objects.expect_graph = true;
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![objects]);

    let event = update("/items/42", &[LDP_CONTAINER, PCDM_OBJECT]);
    h.submit(&event).await;
    let report = h.process().await;

    assert_eq!(report.event_id, event.event_id);
    assert_eq!(report.action_for("objects"), Some(StatusAction::Updated));

    let upserts = h.sink.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].model, "objects");
    assert_eq!(upserts[0].path, "/items/42");
    for node in upserts[0].document["@graph"].as_array().unwrap() {
        assert_eq!(node[PROVENANCE_KEY]["event_id"], event.event_id.as_str());
        assert_eq!(node[PROVENANCE_KEY]["update_types"], json!(["Update"]));
    }

    let rows = h.rows("/items/42").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].model, "objects");
    assert_eq!(rows[0].action, StatusAction::Updated);
    assert_eq!(rows[0].source, "direct");
    assert_eq!(rows[0].event_id, event.event_id);
    assert_eq!(rows[0].transform_service, "http://localhost:8080/rest/items/42");
    assert_eq!(rows[0].db_response["result"], "created");

    assert_eq!(h.storage.pending_count().await.unwrap(), 0);
    assert!(matches!(h.engine.poll_once().await.unwrap(), PollOutcome::Idle));
}

#[tokio::test]
async fn only_the_latest_pending_event_is_processed() {
    let repo = FakeRepository::new().with_document("/items/1", 200, json!({"title": "v2"}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &[])]);

    let first = update("/items/1", &[PCDM_OBJECT]);
    let second = update("/items/1", &[PCDM_OBJECT]);
    h.submit(&first).await;
    h.submit(&second).await;

    let report = h.process().await;
    assert_eq!(report.event_id, second.event_id);
    assert_eq!(h.sink.upserts().len(), 1);
    assert!(matches!(h.engine.poll_once().await.unwrap(), PollOutcome::Idle));
}

#[tokio::test]
async fn types_are_resolved_by_head_probe_when_missing() {
    let repo = FakeRepository::new()
        .with_head("/items/5", &[PCDM_OBJECT])
        .with_document("/items/5", 200, json!({"title": "five"}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &["pcdm:Object"])]);

    h.submit(&update("/items/5", &[])).await;
    let report = h.process().await;

    assert_eq!(report.container_types, vec![PCDM_OBJECT.to_string()]);
    assert_eq!(report.action_for("objects"), Some(StatusAction::Updated));
    assert_eq!(h.repo.head_calls(), vec!["/items/5".to_string()]);
}

#[tokio::test]
async fn write_index_and_workflows_flow_through() {
    let repo = FakeRepository::new().with_document("/drafts/3", 200, json!({"title": "draft"}));
    let mut reviewed = model("reviewed", &[]);
    reviewed.workflows = vec!["review".to_string()];
    let h = harness_with(
        repo,
        RecordingIndexSink::new("direct"),
        vec![reviewed],
        StaticWorkflows::new().bind("/drafts/3", "review"),
        EngineConfig::default(),
    );

    let event = update("/drafts/3", &[PCDM_OBJECT]).with_write_index(Some("reviewed-v2".into()));
    h.submit(&event).await;
    h.process().await;

    assert_eq!(h.sink.upserts()[0].write_index.as_deref(), Some("reviewed-v2"));
    let rows = h.rows("/drafts/3").await;
    assert_eq!(rows[0].workflow_types, vec!["review".to_string()]);
}

#[tokio::test]
async fn models_sharing_a_transform_fetch_once() {
    let repo = FakeRepository::new()
        .with_transform("/items/8", "fcr:transform/solr", 200, json!({"id": "8"}))
        .with_document("/items/8", 200, json!({"@id": "x"}));
    let mut search = model("search", &[]);
    search.transform_endpoint = Some("fcr:transform/solr".into());
    let mut facets = model("facets", &[]);
    facets.transform_endpoint = Some("fcr:transform/solr".into());
    let raw = model("raw", &[]);
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![search, facets, raw]);

    h.submit(&update("/items/8", &[PCDM_OBJECT])).await;
    h.process().await;

    let fetches = h.repo.fetch_calls();
    assert_eq!(fetches.len(), 2, "one fetch per distinct transform target");
    assert_eq!(h.sink.upserts().len(), 3);
    let rows = h.rows("/items/8").await;
    let search_row = rows.iter().find(|r| r.model == "search").unwrap();
    assert!(search_row.transform_service.ends_with("/fcr:transform/solr"));
}

// ─── Access control ──────────────────────────────────────────────────────

#[tokio::test]
async fn acl_change_requeues_the_root_with_resolved_types() {
    let repo = FakeRepository::new()
        .with_head("/items/42", &[LDP_CONTAINER, PCDM_OBJECT])
        .with_document("/items/42", 200, json!({"title": "harbour"}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &["pcdm:Object"])]);

    h.submit(&update("/items/42/fcr:acl", &[])).await;
    let report = h.process().await;

    assert_eq!(report.acl_requeued.as_deref(), Some("/items/42"));
    let requeued = h
        .storage
        .pending_event("/items/42")
        .await
        .unwrap()
        .expect("root reindex queued");
    assert_eq!(requeued.update_types, vec![UpdateType::Reindex]);
    assert_eq!(
        requeued.container_types,
        vec![LDP_CONTAINER.to_string(), PCDM_OBJECT.to_string()]
    );

    // The acl facet itself binds to no model.
    let acl_rows = h.rows("/items/42/fcr:acl").await;
    assert_eq!(acl_rows.len(), 1);
    assert_eq!(acl_rows[0].model, "");
    assert_eq!(acl_rows[0].message, MSG_NO_MODEL);

    let root_report = h.process().await;
    assert_eq!(root_report.acl_requeued, None);
    assert_eq!(root_report.action_for("objects"), Some(StatusAction::Updated));
    assert!(matches!(h.engine.poll_once().await.unwrap(), PollOutcome::Idle));
}

#[tokio::test]
async fn acl_typed_root_does_not_requeue_itself() {
    let repo = FakeRepository::new().with_document("/policies", 200, json!({}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("all", &[])]);

    h.submit(&update("/policies", &[WEBAC_ACL])).await;
    let report = h.process().await;

    assert_eq!(report.acl_requeued, None);
    assert_eq!(h.storage.pending_count().await.unwrap(), 0);
}

// ─── Deletes ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_falls_back_to_ledger_types() {
    let repo = FakeRepository::new().with_document("/items/6", 200, json!({"title": "six"}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &["pcdm:Object"])]);

    h.submit(&update("/items/6", &[PCDM_OBJECT])).await;
    h.process().await;
    assert!(h.sink.document("objects", "/items/6").is_some());

    let delete = Event::new("/items/6", vec![], vec![UpdateType::Delete]);
    h.submit(&delete).await;
    let report = h.process().await;

    assert_eq!(report.container_types, vec![PCDM_OBJECT.to_string()]);
    assert_eq!(report.action_for("objects"), Some(StatusAction::Deleted));
    assert!(h.sink.document("objects", "/items/6").is_none());

    let rows = h.rows("/items/6").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, StatusAction::Deleted);
    assert_eq!(rows[0].event_id, delete.event_id);
    assert_eq!(rows[0].db_response["result"], "deleted");
}

#[tokio::test]
async fn purge_removes_once_for_every_model() {
    let sink = RecordingIndexSink::new("direct")
        .with_document("objects", "/items/4")
        .with_document("everything", "/items/4");
    let h = harness(
        FakeRepository::new(),
        sink,
        vec![model("objects", &[]), model("everything", &[])],
    );

    h.submit(&Event::new("/items/4", vec![PCDM_OBJECT.into()], vec![UpdateType::Purge]))
        .await;
    h.process().await;

    assert_eq!(h.sink.removals(), vec!["/items/4".to_string()]);
    let rows = h.rows("/items/4").await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.action == StatusAction::Deleted));
    assert!(rows.iter().all(|r| r.db_response["result"] == "deleted"));
}

// ─── Business rules ──────────────────────────────────────────────────────

#[tokio::test]
async fn no_matching_model_records_ignored_and_prunes_stale_rows() {
    let repo = FakeRepository::new().with_document("/items/2", 200, json!({}));
    let h = harness(
        repo,
        RecordingIndexSink::new("direct"),
        vec![model("objects", &["pcdm:Object"]), model("collections", &["pcdm:Collection"])],
    );

    h.submit(&update("/items/2", &[PCDM_OBJECT])).await;
    h.process().await;
    h.submit(&update("/items/2", &[PCDM_COLLECTION])).await;
    h.process().await;

    let rows = h.rows("/items/2").await;
    assert_eq!(rows.len(), 1, "objects row pruned once the model stopped binding");
    assert_eq!(rows[0].model, "collections");

    h.submit(&update("/items/2", &[PCDM_FILE])).await;
    let report = h.process().await;
    assert_eq!(report.action_for(""), Some(StatusAction::Ignored));

    let rows = h.rows("/items/2").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].model, "");
    assert_eq!(rows[0].action, StatusAction::Ignored);
    assert_eq!(rows[0].message, MSG_NO_MODEL);
}

#[tokio::test]
async fn models_on_another_channel_do_not_bind() {
    let mut stored = model("stored", &[]);
    stored.channels = vec!["store".to_string()];
    let h = harness(FakeRepository::new(), RecordingIndexSink::new("direct"), vec![stored]);

    h.submit(&update("/items/3", &[PCDM_OBJECT])).await;
    let report = h.process().await;

    assert_eq!(report.outcomes, vec![(String::new(), StatusAction::Ignored)]);
    assert!(h.repo.fetch_calls().is_empty());
}

#[tokio::test]
async fn raw_binary_is_skipped_but_its_companion_is_indexed() {
    let repo = FakeRepository::new().with_document(
        "/items/42/scan.tif/fcr:metadata",
        200,
        load_fixture_value("graphs/binary_description.json"),
    );
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("files", &[])]);

    h.submit(&update("/items/42/scan.tif", &[FEDORA_BINARY, PCDM_FILE])).await;
    let report = h.process().await;
    assert_eq!(report.action_for("files"), Some(StatusAction::Ignored));
    assert_eq!(h.rows("/items/42/scan.tif").await[0].message, MSG_RAW_BINARY);
    assert!(h.repo.fetch_calls().is_empty());

    h.submit(&update("/items/42/scan.tif/fcr:metadata", &[FEDORA_BINARY, PCDM_FILE]))
        .await;
    let report = h.process().await;
    assert_eq!(report.action_for("files"), Some(StatusAction::Updated));
    assert_eq!(h.sink.upserts()[0].path, "/items/42/scan.tif/fcr:metadata");
}

#[tokio::test]
async fn ignored_types_are_removed_unless_reserved() {
    let sink = RecordingIndexSink::new("direct")
        .with_document("objects", "/items/7")
        .with_document("objects", "/items/7/fcr:metadata");
    let config = EngineConfig {
        ignore_types: vec![HIDDEN.to_string()],
        ..Default::default()
    };
    let h = harness_with(
        FakeRepository::new(),
        sink,
        vec![model("objects", &[])],
        StaticWorkflows::new(),
        config,
    );

    h.submit(&update("/items/7", &[PCDM_OBJECT, HIDDEN])).await;
    let report = h.process().await;
    assert_eq!(report.action_for("objects"), Some(StatusAction::Ignored));
    assert_eq!(h.sink.removals(), vec!["/items/7".to_string()]);
    assert!(h.sink.document("objects", "/items/7").is_none());

    h.submit(&update("/items/7/fcr:metadata", &[HIDDEN])).await;
    h.process().await;
    assert_eq!(h.sink.removals().len(), 1, "reserved paths are not removed");
    assert!(h.sink.document("objects", "/items/7/fcr:metadata").is_some());
}

#[tokio::test]
async fn graph_model_rejects_an_empty_graph() {
    let repo = FakeRepository::new().with_document(
        "/items/11",
        200,
        json!({"@id": "http://localhost:8080/rest/items/11", "@graph": []}),
    );
    let mut objects = model("objects", &[]);
    objects.expect_graph = true;
    let sink = RecordingIndexSink::new("direct").with_document("objects", "/items/11");
    let h = harness(repo, sink, vec![objects]);

    h.submit(&update("/items/11", &[PCDM_OBJECT])).await;
    let report = h.process().await;

    assert_eq!(report.action_for("objects"), Some(StatusAction::Ignored));
    assert!(h.sink.upserts().is_empty());
    assert!(h.sink.document("objects", "/items/11").is_none());
    assert!(h.rows("/items/11").await[0].message.contains("@graph"));
}

// ─── Failures ────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_rejection_is_recorded_and_acknowledged() {
    let repo = FakeRepository::new().with_document("/items/12", 200, json!({}));
    let sink = RecordingIndexSink::new("direct").rejecting("/items/12");
    let h = harness(repo, sink, vec![model("objects", &[])]);

    h.submit(&update("/items/12", &[PCDM_OBJECT])).await;
    let report = h.process().await;

    assert_eq!(report.action_for("objects"), Some(StatusAction::Error));
    let rows = h.rows("/items/12").await;
    assert_eq!(rows[0].action, StatusAction::Error);
    assert!(rows[0].message.contains("rejected"), "{}", rows[0].message);
    assert_eq!(h.storage.pending_count().await.unwrap(), 0);

    let errors = h
        .storage
        .statuses_by_action(StatusAction::Error, 10)
        .await
        .unwrap();
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn transient_failure_leaves_the_event_pending() {
    let repo = FakeRepository::new().with_document("/items/13", 200, json!({}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &[])]);

    h.submit(&update("/items/13", &[PCDM_OBJECT])).await;
    h.sink.set_unavailable(true);
    let err = h.engine.poll_once().await.expect_err("transient failure escapes");
    assert!(err.is_transient());
    assert_eq!(h.storage.pending_count().await.unwrap(), 1);
    assert!(h.rows("/items/13").await.is_empty());

    h.sink.set_unavailable(false);
    let report = h.process().await;
    assert_eq!(report.action_for("objects"), Some(StatusAction::Updated));
    assert_eq!(h.storage.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn repository_timeout_leaves_the_event_pending() {
    let repo = FakeRepository::new().with_document("/items/14", 200, json!({"title": "slow"}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &[])]);

    h.submit(&update("/items/14", &[PCDM_OBJECT])).await;
    h.repo.set_timing_out("/items/14", true);
    let err = h.engine.poll_once().await.expect_err("timeout escapes");
    assert!(err.is_transient());
    assert_eq!(h.storage.pending_count().await.unwrap(), 1);
    assert!(h.rows("/items/14").await.is_empty());

    h.repo.set_timing_out("/items/14", false);
    let report = h.process().await;
    assert_eq!(report.action_for("objects"), Some(StatusAction::Updated));
    assert_eq!(h.sink.upserts().len(), 1);
}

#[tokio::test]
async fn index_timeout_leaves_the_event_pending() {
    let repo = FakeRepository::new().with_document("/items/15", 200, json!({}));
    let h = harness(repo, RecordingIndexSink::new("direct"), vec![model("objects", &[])]);

    h.submit(&update("/items/15", &[PCDM_OBJECT])).await;
    h.sink.set_timing_out(true);
    let err = h.engine.poll_once().await.expect_err("timeout escapes");
    assert!(err.is_transient());
    let pending = h.storage.pending_event("/items/15").await.unwrap();
    assert!(pending.is_some());
    assert!(h.rows("/items/15").await.is_empty());

    h.sink.set_timing_out(false);
    let report = h.process().await;
    assert_eq!(report.action_for("objects"), Some(StatusAction::Updated));
}
