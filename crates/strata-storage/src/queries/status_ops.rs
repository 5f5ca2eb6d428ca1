//! Status ledger: upsert by (path, model), prune stale bindings, lookups.

use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::{StatusAction, StatusRecord};

use super::{
    corrupt, format_ts, from_json, from_json_value, from_micros, parse_ts, to_json, to_micros,
};
use crate::to_storage_err;

const TABLE: &str = "status_ledger";

const SELECT_STATUS: &str = "SELECT path, model, event_id, event_timestamp, container_types,
        update_types, workflow_types, action, message, db_response, transform_service,
        source, updated
     FROM status_ledger";

/// Insert or overwrite the row for `(record.path, record.model)`.
pub fn upsert_status(conn: &Connection, record: &StatusRecord) -> StrataResult<()> {
    let updated = format_ts(&record.updated.unwrap_or_else(chrono::Utc::now));
    conn.execute(
        "INSERT INTO status_ledger (
            path, model, event_id, event_timestamp, container_types, update_types,
            workflow_types, action, message, db_response, transform_service, source, updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT(path, model) DO UPDATE SET
            event_id = excluded.event_id,
            event_timestamp = excluded.event_timestamp,
            container_types = excluded.container_types,
            update_types = excluded.update_types,
            workflow_types = excluded.workflow_types,
            action = excluded.action,
            message = excluded.message,
            db_response = excluded.db_response,
            transform_service = excluded.transform_service,
            source = excluded.source,
            updated = excluded.updated",
        params![
            record.path,
            record.model,
            record.event_id,
            to_micros(&record.timestamp),
            to_json(&record.container_types)?,
            to_json(&record.update_types)?,
            to_json(&record.workflow_types)?,
            record.action.as_str(),
            record.message,
            to_json(&record.db_response)?,
            record.transform_service,
            record.source,
            updated,
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert_status: {e}")))?;
    Ok(())
}

/// Delete rows for `path` whose model is not in `keep_models`.
pub fn prune_status(conn: &Connection, path: &str, keep_models: &[String]) -> StrataResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("prune_status begin: {e}")))?;

    let models: Vec<String> = {
        let mut stmt = tx
            .prepare("SELECT model FROM status_ledger WHERE path = ?1")
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![path], |row| row.get::<_, String>(0))
            .map_err(|e| to_storage_err(e.to_string()))?;
        rows.collect::<Result<_, _>>()
            .map_err(|e| to_storage_err(e.to_string()))?
    };

    let mut deleted = 0;
    for model in models.iter().filter(|m| !keep_models.contains(m)) {
        deleted += tx
            .execute(
                "DELETE FROM status_ledger WHERE path = ?1 AND model = ?2",
                params![path, model],
            )
            .map_err(|e| to_storage_err(format!("prune_status: {e}")))?;
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("prune_status commit: {e}")))?;
    Ok(deleted)
}

/// All rows for a path, ordered by model.
pub fn status_for_path(conn: &Connection, path: &str) -> StrataResult<Vec<StatusRecord>> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_STATUS} WHERE path = ?1 ORDER BY model"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![path], read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect(rows)
}

/// Most recently written rows with the given action.
pub fn status_by_action(
    conn: &Connection,
    action: StatusAction,
    limit: usize,
) -> StrataResult<Vec<StatusRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_STATUS} WHERE action = ?1 ORDER BY updated DESC, id DESC LIMIT ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![action.as_str(), limit as i64], read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect(rows)
}

/// Total rows in the ledger.
pub fn count_status(conn: &Connection) -> StrataResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM status_ledger", [], |row| row.get(0))
        .map_err(|e| to_storage_err(format!("count_status: {e}")))?;
    Ok(count as usize)
}

struct RawStatus {
    path: String,
    model: String,
    event_id: String,
    event_timestamp: i64,
    container_types: String,
    update_types: String,
    workflow_types: String,
    action: String,
    message: String,
    db_response: String,
    transform_service: String,
    source: String,
    updated: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStatus> {
    Ok(RawStatus {
        path: row.get(0)?,
        model: row.get(1)?,
        event_id: row.get(2)?,
        event_timestamp: row.get(3)?,
        container_types: row.get(4)?,
        update_types: row.get(5)?,
        workflow_types: row.get(6)?,
        action: row.get(7)?,
        message: row.get(8)?,
        db_response: row.get(9)?,
        transform_service: row.get(10)?,
        source: row.get(11)?,
        updated: row.get(12)?,
    })
}

fn collect(
    rows: impl Iterator<Item = rusqlite::Result<RawStatus>>,
) -> StrataResult<Vec<StatusRecord>> {
    let mut out = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(decode(raw)?);
    }
    Ok(out)
}

fn decode(raw: RawStatus) -> StrataResult<StatusRecord> {
    Ok(StatusRecord {
        timestamp: from_micros(TABLE, raw.event_timestamp)?,
        container_types: from_json(TABLE, &raw.container_types)?,
        update_types: from_json(TABLE, &raw.update_types)?,
        workflow_types: from_json(TABLE, &raw.workflow_types)?,
        action: raw.action.parse().map_err(|e: String| corrupt(TABLE, e))?,
        db_response: from_json_value(TABLE, &raw.db_response)?,
        updated: Some(parse_ts(TABLE, &raw.updated)?),
        path: raw.path,
        model: raw.model,
        event_id: raw.event_id,
        message: raw.message,
        transform_service: raw.transform_service,
        source: raw.source,
    })
}
