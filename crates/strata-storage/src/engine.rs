//! StorageEngine — owns the ConnectionPool, implements EventQueue and
//! StatusLedger, and exposes the index outbox for the store-mediated sink.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;
use strata_core::models::{Event, IndexedDocument, StatusAction, StatusRecord};
use strata_core::traits::{EventQueue, StatusLedger};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::outbox_ops::{self, OutboxEntry};
use crate::queries::{queue_ops, status_ops};

/// The main storage engine. Safe to share behind an `Arc` between the
/// reconciliation loop, recrawl producers, and notification intake.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> StrataResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations before the writer is shared.
    fn initialize(&self) -> StrataResult<()> {
        let version = self
            .pool
            .writer
            .with_conn_sync(migrations::run_migrations)?;
        tracing::info!(
            schema_version = version,
            db_path = ?self.pool.db_path,
            "storage initialized"
        );
        Ok(())
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    /// File-backed: uses the read pool (no writer contention).
    /// In-memory: uses the writer (separate in-memory connections can't see it).
    async fn with_reader<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StrataResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f).await,
        }
    }

    /// The pending event for one path, if any.
    pub async fn pending_event(&self, path: &str) -> StrataResult<Option<Event>> {
        self.with_reader(|conn| queue_ops::event_for_path(conn, path))
            .await
    }

    /// Total rows in the status ledger.
    pub async fn status_count(&self) -> StrataResult<usize> {
        self.with_reader(status_ops::count_status).await
    }

    // --- Index outbox ---

    /// Queue an upsert for the downstream index loader.
    pub async fn outbox_upsert(
        &self,
        model: &str,
        doc_id: &str,
        write_index: Option<&str>,
        payload: &Value,
    ) -> StrataResult<i64> {
        self.pool
            .writer
            .with_conn(|conn| outbox_ops::append_upsert(conn, model, doc_id, write_index, payload))
            .await
    }

    /// Queue removals of `doc_id` from every model holding it.
    pub async fn outbox_remove(&self, doc_id: &str) -> StrataResult<Vec<(String, i64)>> {
        self.pool
            .writer
            .with_conn(|conn| outbox_ops::append_remove(conn, doc_id))
            .await
    }

    /// Documents indexed through the outbox strictly below `path`.
    pub async fn indexed_descendants(&self, path: &str) -> StrataResult<Vec<IndexedDocument>> {
        self.with_reader(|conn| outbox_ops::indexed_descendants(conn, path))
            .await
    }

    /// Oldest undelivered outbox rows, for the downstream loader.
    pub async fn pending_outbox(&self, limit: usize) -> StrataResult<Vec<OutboxEntry>> {
        self.with_reader(|conn| outbox_ops::pending_outbox(conn, limit))
            .await
    }

    /// Mark outbox rows delivered once the loader has applied them.
    pub async fn mark_outbox_delivered(&self, ids: &[i64]) -> StrataResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| outbox_ops::mark_delivered(conn, ids))
            .await
    }
}

#[async_trait]
impl EventQueue for StorageEngine {
    async fn enqueue(&self, event: &Event) -> StrataResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queue_ops::upsert_event(conn, event))
            .await?;
        tracing::debug!(path = %event.path, event_id = %event.event_id, "event enqueued");
        Ok(())
    }

    async fn enqueue_if_absent(&self, event: &Event) -> StrataResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| queue_ops::insert_event_if_absent(conn, event))
            .await
    }

    async fn dequeue_oldest(&self) -> StrataResult<Option<Event>> {
        // Read through the writer: the consumer must see its own acknowledgements.
        self.pool.writer.with_conn(queue_ops::oldest_event).await
    }

    async fn acknowledge(&self, event_id: &str) -> StrataResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| queue_ops::delete_event(conn, event_id))
            .await
    }

    async fn pending_count(&self) -> StrataResult<usize> {
        self.with_reader(queue_ops::count_events).await
    }
}

#[async_trait]
impl StatusLedger for StorageEngine {
    async fn record_status(&self, record: &StatusRecord) -> StrataResult<()> {
        self.pool
            .writer
            .with_conn(|conn| status_ops::upsert_status(conn, record))
            .await
    }

    async fn prune_status(&self, path: &str, keep_models: &[String]) -> StrataResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| status_ops::prune_status(conn, path, keep_models))
            .await
    }

    async fn status_for(&self, path: &str) -> StrataResult<Vec<StatusRecord>> {
        self.with_reader(|conn| status_ops::status_for_path(conn, path))
            .await
    }

    async fn statuses_by_action(
        &self,
        action: StatusAction,
        limit: usize,
    ) -> StrataResult<Vec<StatusRecord>> {
        self.with_reader(|conn| status_ops::status_by_action(conn, action, limit))
            .await
    }
}
