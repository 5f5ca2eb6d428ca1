//! Query functions, one module per table. Each takes a plain `&Connection`
//! so callers decide which connection (writer or reader) runs it.

pub mod outbox_ops;
pub mod queue_ops;
pub mod status_ops;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use strata_core::errors::{StorageError, StrataError, StrataResult};

/// Timestamps are stored as fixed-width UTC RFC 3339 so they sort lexically.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(table: &str, raw: &str) -> StrataResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp {raw:?}: {e}")))
}

/// Event timestamps are stored as epoch microseconds. Every representable
/// `DateTime<Utc>` fits, and the column orders numerically.
pub(crate) fn to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub(crate) fn from_micros(table: &str, micros: i64) -> StrataResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| corrupt(table, format!("timestamp out of range: {micros}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> StrataResult<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(table: &str, raw: &str) -> StrataResult<T> {
    serde_json::from_str(raw).map_err(|e| corrupt(table, format!("bad json {raw:?}: {e}")))
}

pub(crate) fn from_json_value(table: &str, raw: &str) -> StrataResult<Value> {
    from_json(table, raw)
}

pub(crate) fn corrupt(table: &str, details: String) -> StrataError {
    StorageError::CorruptRow {
        table: table.to_string(),
        details,
    }
    .into()
}
