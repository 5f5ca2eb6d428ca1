//! Durable queue: upsert by path, oldest-first peek, acknowledge by event id.

use rusqlite::{params, Connection, OptionalExtension};

use strata_core::errors::StrataResult;
use strata_core::models::{Event, UpdateType};

use super::{format_ts, from_json, from_micros, to_json, to_micros};
use crate::to_storage_err;

const TABLE: &str = "event_queue";

/// Insert or overwrite the pending event for `event.path`.
pub fn upsert_event(conn: &Connection, event: &Event) -> StrataResult<()> {
    let now = format_ts(&chrono::Utc::now());
    conn.execute(
        "INSERT INTO event_queue (
            path, event_id, event_timestamp, container_types, update_types, write_index, updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(path) DO UPDATE SET
            event_id = excluded.event_id,
            event_timestamp = excluded.event_timestamp,
            container_types = excluded.container_types,
            update_types = excluded.update_types,
            write_index = excluded.write_index,
            updated = excluded.updated",
        params![
            event.path,
            event.event_id,
            to_micros(&event.timestamp),
            to_json(&event.container_types)?,
            to_json(&event.update_types)?,
            event.write_index,
            now,
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert_event: {e}")))?;
    Ok(())
}

/// Insert the event only if nothing is pending for its path.
pub fn insert_event_if_absent(conn: &Connection, event: &Event) -> StrataResult<bool> {
    let now = format_ts(&chrono::Utc::now());
    let inserted = conn
        .execute(
            "INSERT INTO event_queue (
                path, event_id, event_timestamp, container_types, update_types, write_index, updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(path) DO NOTHING",
            params![
                event.path,
                event.event_id,
                to_micros(&event.timestamp),
                to_json(&event.container_types)?,
                to_json(&event.update_types)?,
                event.write_index,
                now,
            ],
        )
        .map_err(|e| to_storage_err(format!("insert_event_if_absent: {e}")))?;
    Ok(inserted > 0)
}

/// Oldest pending event by timestamp, insertion order breaking ties.
pub fn oldest_event(conn: &Connection) -> StrataResult<Option<Event>> {
    let row = conn
        .query_row(
            &format!("{SELECT_EVENT} ORDER BY event_timestamp ASC, seq ASC LIMIT 1"),
            [],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(format!("oldest_event: {e}")))?;
    row.map(decode).transpose()
}

/// Delete the row carrying `event_id`.
pub fn delete_event(conn: &Connection, event_id: &str) -> StrataResult<bool> {
    let deleted = conn
        .execute("DELETE FROM event_queue WHERE event_id = ?1", params![event_id])
        .map_err(|e| to_storage_err(format!("delete_event: {e}")))?;
    Ok(deleted > 0)
}

/// Number of pending rows.
pub fn count_events(conn: &Connection) -> StrataResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM event_queue", [], |row| row.get(0))
        .map_err(|e| to_storage_err(format!("count_events: {e}")))?;
    Ok(count as usize)
}

/// The pending event for one path, if any.
pub fn event_for_path(conn: &Connection, path: &str) -> StrataResult<Option<Event>> {
    let row = conn
        .query_row(
            &format!("{SELECT_EVENT} WHERE path = ?1"),
            params![path],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(format!("event_for_path: {e}")))?;
    row.map(decode).transpose()
}

const SELECT_EVENT: &str = "SELECT event_id, event_timestamp, path, container_types, update_types, write_index
     FROM event_queue";

type RawEvent = (String, i64, String, String, String, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode(raw: RawEvent) -> StrataResult<Event> {
    let (event_id, ts, path, container_types, update_types, write_index) = raw;
    Ok(Event {
        event_id,
        timestamp: from_micros(TABLE, ts)?,
        path,
        container_types: from_json::<Vec<String>>(TABLE, &container_types)?,
        update_types: from_json::<Vec<UpdateType>>(TABLE, &update_types)?,
        write_index,
    })
}
