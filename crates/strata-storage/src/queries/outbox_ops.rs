//! Store-mediated indexing: an append-only outbox of index operations plus
//! a table of what is currently indexed, for descendant lookups.

use rusqlite::{params, Connection};
use serde_json::Value;

use strata_core::errors::StrataResult;
use strata_core::models::IndexedDocument;

use super::{corrupt, format_ts, from_json_value, to_json};
use crate::to_storage_err;

const TABLE: &str = "index_outbox";

/// Kind of index operation queued for the downstream loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxOperation {
    Upsert,
    Remove,
}

impl OutboxOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            OutboxOperation::Upsert => "upsert",
            OutboxOperation::Remove => "remove",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "upsert" => Some(OutboxOperation::Upsert),
            "remove" => Some(OutboxOperation::Remove),
            _ => None,
        }
    }
}

/// One undelivered outbox row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEntry {
    pub id: i64,
    pub model: String,
    pub doc_id: String,
    pub operation: OutboxOperation,
    pub write_index: Option<String>,
    pub payload: Value,
}

/// Queue an upsert and mark the document as indexed. Returns the outbox id.
pub fn append_upsert(
    conn: &Connection,
    model: &str,
    doc_id: &str,
    write_index: Option<&str>,
    payload: &Value,
) -> StrataResult<i64> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("append_upsert begin: {e}")))?;
    tx.execute(
        "INSERT INTO index_outbox (model, doc_id, operation, write_index, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            model,
            doc_id,
            OutboxOperation::Upsert.as_str(),
            write_index,
            to_json(payload)?
        ],
    )
    .map_err(|e| to_storage_err(format!("append_upsert: {e}")))?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO indexed_documents (doc_id, model, updated) VALUES (?1, ?2, ?3)
         ON CONFLICT(doc_id, model) DO UPDATE SET updated = excluded.updated",
        params![doc_id, model, format_ts(&chrono::Utc::now())],
    )
    .map_err(|e| to_storage_err(format!("append_upsert indexed: {e}")))?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("append_upsert commit: {e}")))?;
    Ok(id)
}

/// Queue a removal for every model currently holding `doc_id`.
/// Returns `(model, outbox id)` per removal; empty when nothing was indexed.
pub fn append_remove(conn: &Connection, doc_id: &str) -> StrataResult<Vec<(String, i64)>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("append_remove begin: {e}")))?;

    let models: Vec<String> = {
        let mut stmt = tx
            .prepare("SELECT model FROM indexed_documents WHERE doc_id = ?1 ORDER BY model")
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![doc_id], |row| row.get::<_, String>(0))
            .map_err(|e| to_storage_err(e.to_string()))?;
        rows.collect::<Result<_, _>>()
            .map_err(|e| to_storage_err(e.to_string()))?
    };

    let mut removed = Vec::with_capacity(models.len());
    for model in models {
        tx.execute(
            "INSERT INTO index_outbox (model, doc_id, operation) VALUES (?1, ?2, ?3)",
            params![model, doc_id, OutboxOperation::Remove.as_str()],
        )
        .map_err(|e| to_storage_err(format!("append_remove: {e}")))?;
        removed.push((model, tx.last_insert_rowid()));
    }
    tx.execute(
        "DELETE FROM indexed_documents WHERE doc_id = ?1",
        params![doc_id],
    )
    .map_err(|e| to_storage_err(format!("append_remove indexed: {e}")))?;

    tx.commit()
        .map_err(|e| to_storage_err(format!("append_remove commit: {e}")))?;
    Ok(removed)
}

/// Indexed documents strictly below `path`.
pub fn indexed_descendants(conn: &Connection, path: &str) -> StrataResult<Vec<IndexedDocument>> {
    let prefix = if path == "/" {
        "/".to_string()
    } else {
        format!("{}/", path.trim_end_matches('/'))
    };
    let pattern = format!("{}%", escape_like(&prefix));
    let mut stmt = conn
        .prepare(
            "SELECT doc_id, model FROM indexed_documents
             WHERE doc_id LIKE ?1 ESCAPE '\\' AND doc_id != ?2
             ORDER BY doc_id, model",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![pattern, path], |row| {
            Ok(IndexedDocument {
                id: row.get(0)?,
                model: row.get(1)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<_, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Oldest undelivered outbox rows.
pub fn pending_outbox(conn: &Connection, limit: usize) -> StrataResult<Vec<OutboxEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, model, doc_id, operation, write_index, payload
             FROM index_outbox WHERE delivered = 0 ORDER BY id LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, model, doc_id, operation, write_index, payload) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let operation = OutboxOperation::parse(&operation)
            .ok_or_else(|| corrupt(TABLE, format!("unknown operation {operation:?}")))?;
        out.push(OutboxEntry {
            id,
            model,
            doc_id,
            operation,
            write_index,
            payload: from_json_value(TABLE, &payload)?,
        });
    }
    Ok(out)
}

/// Mark outbox rows as delivered. Returns how many were updated.
pub fn mark_delivered(conn: &Connection, ids: &[i64]) -> StrataResult<usize> {
    let mut updated = 0;
    for id in ids {
        updated += conn
            .execute(
                "UPDATE index_outbox SET delivered = 1 WHERE id = ?1 AND delivered = 0",
                params![id],
            )
            .map_err(|e| to_storage_err(format!("mark_delivered: {e}")))?;
    }
    Ok(updated)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
