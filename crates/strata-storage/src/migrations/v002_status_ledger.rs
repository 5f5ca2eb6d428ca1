//! v002: status_ledger. One row per (path, model).

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS status_ledger (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            path              TEXT NOT NULL,
            model             TEXT NOT NULL DEFAULT '',
            event_id          TEXT NOT NULL,
            event_timestamp   INTEGER NOT NULL,
            container_types   TEXT NOT NULL DEFAULT '[]',
            update_types      TEXT NOT NULL DEFAULT '[]',
            workflow_types    TEXT NOT NULL DEFAULT '[]',
            action            TEXT NOT NULL,
            message           TEXT NOT NULL DEFAULT '',
            db_response       TEXT NOT NULL DEFAULT 'null',
            transform_service TEXT NOT NULL DEFAULT '',
            source            TEXT NOT NULL DEFAULT '',
            updated           TEXT NOT NULL,
            UNIQUE (path, model)
        );

        CREATE INDEX IF NOT EXISTS idx_status_ledger_action
            ON status_ledger(action, updated);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
