//! v001: event_queue. One pending row per path.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS event_queue (
            seq             INTEGER PRIMARY KEY AUTOINCREMENT,
            path            TEXT NOT NULL UNIQUE,
            event_id        TEXT NOT NULL,
            event_timestamp INTEGER NOT NULL,
            container_types TEXT NOT NULL DEFAULT '[]',
            update_types    TEXT NOT NULL DEFAULT '[]',
            write_index     TEXT,
            updated         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_event_queue_order
            ON event_queue(event_timestamp, seq);
        CREATE INDEX IF NOT EXISTS idx_event_queue_event_id
            ON event_queue(event_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
