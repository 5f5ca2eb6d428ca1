//! Versioned schema migrations, tracked in `schema_version`.

mod v001_event_queue;
mod v002_status_ledger;
mod v003_index_outbox;

use rusqlite::{params, Connection};

use strata_core::errors::{StorageError, StrataResult};

use crate::to_storage_err;

type Migration = fn(&Connection) -> StrataResult<()>;

/// All migrations in order. Versions are 1-based positions in this list.
const MIGRATIONS: &[(u32, &str, Migration)] = &[
    (1, "event_queue", v001_event_queue::migrate),
    (2, "status_ledger", v002_status_ledger::migrate),
    (3, "index_outbox", v003_index_outbox::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded schema version.
/// Each migration runs in its own transaction.
pub fn run_migrations(conn: &Connection) -> StrataResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, name, migrate) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("migration {version} begin: {e}")))?;
        migrate(&tx).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            params![version, name],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tx.commit()
            .map_err(|e| to_storage_err(format!("migration {version} commit: {e}")))?;
        tracing::debug!(version, name, "applied migration");
    }
    current_version(conn)
}

/// Highest applied schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StrataResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
