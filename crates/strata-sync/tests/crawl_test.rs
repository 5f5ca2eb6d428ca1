//! Bulk recrawl traversal against a fake repository.

use std::sync::Arc;

use strata_core::config::CrawlConfig;
use strata_core::constants::{FEDORA_BINARY, LDP_NON_RDF_SOURCE};
use strata_core::traits::EventQueue;
use strata_core::{Event, UpdateType};
use strata_storage::StorageEngine;
use strata_sync::{CrawlOptions, RecrawlRequest, Recrawler};
use test_fixtures::{container_graph, load_fixture_value, FakeRepository, FIXTURE_BASE_URL};

const PCDM_OBJECT: &str = "http://pcdm.org/models#Object";
const PCDM_FILE: &str = "http://pcdm.org/models#File";

fn crawler(repo: FakeRepository) -> (Arc<StorageEngine>, Arc<FakeRepository>, Arc<Recrawler>) {
    let storage = Arc::new(StorageEngine::open_in_memory().expect("in-memory storage"));
    let repo = Arc::new(repo);
    let crawler = Recrawler::new(
        storage.clone(),
        repo.clone(),
        &CrawlConfig::default(),
        FIXTURE_BASE_URL,
    );
    (storage, repo, Arc::new(crawler))
}

fn tree() -> FakeRepository {
    FakeRepository::new()
        .with_graph("/r", container_graph("/r", &[PCDM_OBJECT], &["/r/c1", "/r/c2"]))
        .with_graph("/r/c1", container_graph("/r/c1", &[PCDM_OBJECT], &["/r/c1/g"]))
        .with_graph("/r/c2", container_graph("/r/c2", &[PCDM_OBJECT], &[]))
        .with_graph("/r/c1/g", container_graph("/r/c1/g", &[PCDM_OBJECT], &[]))
}

// ─── Traversal ───────────────────────────────────────────────────────────

#[tokio::test]
async fn visits_depth_first_in_listed_order() {
    let (storage, repo, crawler) = crawler(tree());

    let report = crawler.crawl("/r", &CrawlOptions::default()).await.unwrap();

    assert_eq!(repo.graph_calls(), vec!["/r", "/r/c1", "/r/c1/g", "/r/c2"]);
    assert_eq!(report.visited, 4);
    assert_eq!(report.emitted, 4);
    assert_eq!(storage.pending_count().await.unwrap(), 4);

    let event = storage.pending_event("/r/c1/g").await.unwrap().unwrap();
    assert_eq!(event.update_types, vec![UpdateType::Reindex]);
    assert_eq!(event.container_types, vec![PCDM_OBJECT.to_string()]);
}

#[tokio::test]
async fn cycles_visit_each_path_once() {
    let repo = FakeRepository::new()
        .with_graph("/a", container_graph("/a", &[], &["/b"]))
        .with_graph("/b", container_graph("/b", &[], &["/a", "/b"]));
    let (_storage, repo, crawler) = crawler(repo);

    let report = crawler.crawl("/a", &CrawlOptions::default()).await.unwrap();

    assert_eq!(repo.graph_calls(), vec!["/a", "/b"]);
    assert_eq!(report.visited, 2);
    assert_eq!(report.emitted, 2);
}

#[tokio::test]
async fn depth_limit_never_fetches_grandchildren() {
    let (storage, repo, crawler) = crawler(tree());
    let options = CrawlOptions {
        max_depth: Some(1),
        ..Default::default()
    };

    let report = crawler.crawl("/r", &options).await.unwrap();

    assert_eq!(repo.graph_calls(), vec!["/r", "/r/c1", "/r/c2"]);
    assert_eq!(report.emitted, 3);
    assert_eq!(report.skipped, 1, "the grandchild is seen but not visited");
    assert!(storage.pending_event("/r/c1/g").await.unwrap().is_none());
}

#[tokio::test]
async fn no_crawl_emits_only_the_start_path() {
    let (storage, repo, crawler) = crawler(tree());
    let options = CrawlOptions {
        no_crawl: true,
        ..Default::default()
    };

    crawler.crawl("/r", &options).await.unwrap();

    assert_eq!(repo.graph_calls(), vec!["/r"]);
    assert_eq!(storage.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn follow_relations_extend_containment() {
    let repo = FakeRepository::new().with_graph(
        "/collections/maps",
        load_fixture_value("graphs/collection.json"),
    );
    let (_storage, repo, crawler) = crawler(repo);

    crawler
        .crawl("/collections/maps", &CrawlOptions::default())
        .await
        .unwrap();
    assert!(!repo.graph_calls().contains(&"/items/loose-sheet".to_string()));

    let request =
        RecrawlRequest::from_query("/collections/maps", [("follow", "pcdm:hasMember"), ("force", "")])
            .unwrap();
    crawler.crawl(&request.path, &request.options).await.unwrap();
    assert!(repo.graph_calls().contains(&"/items/loose-sheet".to_string()));
}

// ─── Emitted events ──────────────────────────────────────────────────────

#[tokio::test]
async fn absent_start_path_emits_a_delete_shaped_reindex() {
    let (storage, _repo, crawler) = crawler(FakeRepository::new());

    let report = crawler.crawl("/gone", &CrawlOptions::default()).await.unwrap();

    assert_eq!(report.emitted, 1);
    let event = storage.pending_event("/gone").await.unwrap().unwrap();
    assert_eq!(event.update_types, vec![UpdateType::Reindex, UpdateType::Delete]);
    assert!(event.container_types.is_empty());
}

#[tokio::test]
async fn binaries_also_emit_their_metadata_companion() {
    let repo = FakeRepository::new().with_graph(
        "/items/42/scan.tif",
        load_fixture_value("graphs/binary_description.json"),
    );
    let (storage, _repo, crawler) = crawler(repo);

    let report = crawler
        .crawl("/items/42/scan.tif", &CrawlOptions::default())
        .await
        .unwrap();
    assert_eq!(report.emitted, 2);

    let binary = storage.pending_event("/items/42/scan.tif").await.unwrap().unwrap();
    assert!(binary.has_type(FEDORA_BINARY));

    let companion = storage
        .pending_event("/items/42/scan.tif/fcr:metadata")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(companion.container_types, vec![PCDM_FILE.to_string()]);
    assert!(!companion.has_type(LDP_NON_RDF_SOURCE));
}

#[tokio::test]
async fn is_binary_forces_the_companion_split() {
    let repo = FakeRepository::new().with_graph("/files/f", container_graph("/files/f", &[PCDM_FILE], &[]));
    let (storage, _repo, crawler) = crawler(repo);
    let options = CrawlOptions {
        is_binary: true,
        write_index: Some("files-v2".into()),
        ..Default::default()
    };

    crawler.crawl("/files/f", &options).await.unwrap();

    let companion = storage
        .pending_event("/files/f/fcr:metadata")
        .await
        .unwrap()
        .expect("companion queued");
    assert_eq!(companion.write_index.as_deref(), Some("files-v2"));
}

#[tokio::test]
async fn malformed_graph_abandons_only_its_branch() {
    let repo = FakeRepository::new()
        .with_graph("/r", container_graph("/r", &[], &["/r/bad", "/r/ok"]))
        .with_malformed_graph("/r/bad")
        .with_graph("/r/ok", container_graph("/r/ok", &[], &[]));
    let (storage, _repo, crawler) = crawler(repo);

    let report = crawler.crawl("/r", &CrawlOptions::default()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.emitted, 2);
    assert!(storage.pending_event("/r/ok").await.unwrap().is_some());
    assert!(storage.pending_event("/r/bad").await.unwrap().is_none());
}

#[tokio::test]
async fn non_forced_crawls_leave_live_notifications_alone() {
    let (storage, _repo, crawler) = crawler(tree());
    let live = Event::new("/r/c2", vec![], vec![UpdateType::Update]);
    storage.enqueue(&live).await.unwrap();

    let report = crawler.crawl("/r", &CrawlOptions::default()).await.unwrap();
    assert_eq!(report.skipped, 1);
    let pending = storage.pending_event("/r/c2").await.unwrap().unwrap();
    assert_eq!(pending.event_id, live.event_id);

    let forced = CrawlOptions {
        force: true,
        ..Default::default()
    };
    crawler.crawl("/r", &forced).await.unwrap();
    let pending = storage.pending_event("/r/c2").await.unwrap().unwrap();
    assert_ne!(pending.event_id, live.event_id);
    assert_eq!(pending.update_types, vec![UpdateType::Reindex]);
}

#[tokio::test]
async fn spawned_crawls_run_in_the_background() {
    let (storage, _repo, crawler) = crawler(tree());
    let request = RecrawlRequest::new("http://localhost:8080/rest/r/", CrawlOptions::default());

    crawler.spawn(request).await.expect("crawl task");

    assert_eq!(storage.pending_count().await.unwrap(), 4);
}
