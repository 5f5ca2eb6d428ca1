//! Durable queue: latest-wins coalescing, oldest-first ordering,
//! acknowledgement semantics, restart safety.

use chrono::{Duration, TimeZone, Utc};

use strata_core::models::{Event, UpdateType};
use strata_core::traits::EventQueue;
use strata_storage::StorageEngine;

fn event_at(path: &str, types: &[&str], update: UpdateType, secs_ago: i64) -> Event {
    let mut event = Event::new(
        path,
        types.iter().map(|t| t.to_string()).collect(),
        vec![update],
    );
    event.timestamp = Utc::now() - Duration::seconds(secs_ago);
    event
}

#[tokio::test]
async fn enqueue_same_path_twice_keeps_one_row_with_latest_payload() {
    let storage = StorageEngine::open_in_memory().unwrap();

    let first = event_at("/a", &["Thing"], UpdateType::Create, 10);
    let second = event_at("/a", &["Thing", "Other"], UpdateType::Update, 5);
    storage.enqueue(&first).await.unwrap();
    storage.enqueue(&second).await.unwrap();

    assert_eq!(storage.pending_count().await.unwrap(), 1);
    let pending = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(pending.event_id, second.event_id);
    assert_eq!(pending.update_types, vec![UpdateType::Update]);
    assert_eq!(pending.container_types, vec!["Thing", "Other"]);
}

#[tokio::test]
async fn dequeue_returns_oldest_without_removing() {
    let storage = StorageEngine::open_in_memory().unwrap();
    storage.enqueue(&event_at("/new", &[], UpdateType::Update, 1)).await.unwrap();
    storage.enqueue(&event_at("/old", &[], UpdateType::Update, 60)).await.unwrap();

    let first = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(first.path, "/old");
    // Peeking again returns the same row until it is acknowledged.
    let again = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(again.event_id, first.event_id);

    assert!(storage.acknowledge(&first.event_id).await.unwrap());
    let next = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(next.path, "/new");
}

#[tokio::test]
async fn empty_queue_dequeues_none() {
    let storage = StorageEngine::open_in_memory().unwrap();
    assert!(storage.dequeue_oldest().await.unwrap().is_none());
    assert!(!storage.acknowledge("missing").await.unwrap());
}

#[tokio::test]
async fn acknowledging_a_superseded_event_keeps_the_newer_one() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let processing = event_at("/a", &[], UpdateType::Update, 10);
    storage.enqueue(&processing).await.unwrap();

    // A newer notification coalesces onto the path while the old one is in flight.
    let newer = event_at("/a", &[], UpdateType::Delete, 1);
    storage.enqueue(&newer).await.unwrap();

    assert!(!storage.acknowledge(&processing.event_id).await.unwrap());
    let pending = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(pending.event_id, newer.event_id);
}

#[tokio::test]
async fn enqueue_if_absent_never_clobbers_pending_rows() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let live = event_at("/a", &["Thing"], UpdateType::Update, 5);
    storage.enqueue(&live).await.unwrap();

    let crawl = Event::reindex("/a", vec![]);
    assert!(!storage.enqueue_if_absent(&crawl).await.unwrap());
    assert_eq!(
        storage.pending_event("/a").await.unwrap().unwrap().event_id,
        live.event_id
    );

    let fresh = Event::reindex("/b", vec![]).with_write_index(Some("shadow".into()));
    assert!(storage.enqueue_if_absent(&fresh).await.unwrap());
    let stored = storage.pending_event("/b").await.unwrap().unwrap();
    assert_eq!(stored.write_index.as_deref(), Some("shadow"));
}

#[tokio::test]
async fn unacknowledged_events_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("strata.db");
    let config = strata_core::config::StorageConfig::default();

    let event = event_at("/persist", &["Thing"], UpdateType::Create, 3);
    {
        let storage = StorageEngine::open(&db, &config).unwrap();
        storage.enqueue(&event).await.unwrap();
    }

    let reopened = StorageEngine::open(&db, &config).unwrap();
    let pending = reopened.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(pending.event_id, event.event_id);
    assert_eq!(pending.timestamp.timestamp_micros(), event.timestamp.timestamp_micros());
    assert_eq!(reopened.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn five_digit_years_round_trip_and_order_after_current_events() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let mut far = event_at("/far", &[], UpdateType::Update, 0);
    far.timestamp = Utc.timestamp_millis_opt(999_999_999_999_999).unwrap();
    storage.enqueue(&far).await.unwrap();
    storage.enqueue(&event_at("/now", &[], UpdateType::Update, 1)).await.unwrap();

    let first = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(first.path, "/now");
    storage.acknowledge(&first.event_id).await.unwrap();

    let second = storage.dequeue_oldest().await.unwrap().unwrap();
    assert_eq!(second.path, "/far");
    assert_eq!(second.timestamp, far.timestamp);
}
