//! v003: index_outbox and indexed_documents for store-mediated indexing.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS index_outbox (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            model       TEXT NOT NULL,
            doc_id      TEXT NOT NULL,
            operation   TEXT NOT NULL,
            write_index TEXT,
            payload     TEXT NOT NULL DEFAULT 'null',
            delivered   INTEGER NOT NULL DEFAULT 0,
            created     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_index_outbox_pending
            ON index_outbox(delivered, id);

        CREATE TABLE IF NOT EXISTS indexed_documents (
            doc_id  TEXT NOT NULL,
            model   TEXT NOT NULL,
            updated TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (doc_id, model)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
