//! Event intake: maps bus messages onto canonical [`Event`]s.
//!
//! Two shapes arrive on the bus. Internal messages carry
//! [`HEADER_INTERNAL`] and an explicit [`HEADER_EVENT_TYPE`], with a JSON-LD
//! body holding `@id` and `@type`. Native repository notifications carry the
//! identifier, timestamp and resource types as headers and list their event
//! labels in a body `type` array.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde_json::Value;

use strata_core::constants::{
    HEADER_EVENT_ID, HEADER_EVENT_TYPE, HEADER_IDENTIFIER, HEADER_INTERNAL,
    HEADER_RESOURCE_TYPE, HEADER_TIMESTAMP, JSONLD_ID, JSONLD_TYPE,
};
use strata_core::errors::NormalizeError;
use strata_core::paths::canonicalize;
use strata_core::traits::EventQueue;
use strata_core::{Event, StrataResult, UpdateType};

/// A message as delivered by the bus.
#[derive(Debug, Clone, Default)]
pub struct BusMessage {
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl BusMessage {
    pub fn new(body: Value) -> Self {
        Self { headers: HashMap::new(), body }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn is_internal(&self) -> bool {
        self.header(HEADER_INTERNAL)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
            || self.header(HEADER_EVENT_TYPE).is_some()
    }
}

/// Shape normalization for inbound notifications.
pub struct EventNormalizer {
    queue: Arc<dyn EventQueue>,
    base_url: String,
}

impl EventNormalizer {
    pub fn new(queue: Arc<dyn EventQueue>, base_url: impl Into<String>) -> Self {
        Self { queue, base_url: base_url.into() }
    }

    /// Normalize a message and enqueue it. Returns the queued event.
    pub async fn accept(&self, message: &BusMessage) -> StrataResult<Event> {
        let event = self.normalize(message)?;
        self.queue.enqueue(&event).await?;
        tracing::debug!(
            path = %event.path,
            event_id = %event.event_id,
            update_types = ?event.update_types,
            "notification queued"
        );
        Ok(event)
    }

    pub fn normalize(&self, message: &BusMessage) -> StrataResult<Event> {
        if message.is_internal() {
            self.normalize_internal(message)
        } else {
            self.normalize_native(message)
        }
    }

    fn normalize_internal(&self, message: &BusMessage) -> StrataResult<Event> {
        let id = message
            .body
            .get(JSONLD_ID)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(JSONLD_ID))?;
        let label = message
            .header(HEADER_EVENT_TYPE)
            .ok_or_else(|| missing(HEADER_EVENT_TYPE))?;
        let update_types = parse_labels(split_list(label));
        if update_types.is_empty() {
            return Err(NormalizeError::InvalidField {
                field: HEADER_EVENT_TYPE.to_string(),
                value: label.to_string(),
            }
            .into());
        }

        let mut event = Event::new(
            canonicalize(id, &self.base_url),
            string_list(message.body.get(JSONLD_TYPE)),
            update_types,
        );
        if let Some(event_id) = message.header(HEADER_EVENT_ID) {
            event.event_id = event_id.to_string();
        }
        Ok(event)
    }

    fn normalize_native(&self, message: &BusMessage) -> StrataResult<Event> {
        let identifier = message
            .header(HEADER_IDENTIFIER)
            .ok_or_else(|| missing(HEADER_IDENTIFIER))?;
        let labels = string_list(message.body.get("type"));
        let update_types = parse_labels(labels.iter().map(String::as_str));
        if update_types.is_empty() {
            return Err(missing("type"));
        }
        let container_types = message
            .header(HEADER_RESOURCE_TYPE)
            .map(|raw| split_list(raw).map(String::from).collect())
            .unwrap_or_default();

        let mut event = Event::new(
            canonicalize(identifier, &self.base_url),
            container_types,
            update_types,
        );
        if let Some(event_id) = message.header(HEADER_EVENT_ID) {
            event.event_id = event_id.to_string();
        }
        if let Some(raw) = message.header(HEADER_TIMESTAMP) {
            event.timestamp = parse_epoch_millis(raw)?;
        }
        Ok(event)
    }
}

fn missing(field: &str) -> strata_core::StrataError {
    NormalizeError::MissingField { field: field.to_string() }.into()
}

/// Comma-separated list, trimmed, empties dropped.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// A JSON string or array of strings, trimmed, empties dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_list(s).map(String::from).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<UpdateType> {
    let mut out = Vec::new();
    for label in labels {
        match UpdateType::from_label(label) {
            Some(update) if !out.contains(&update) => out.push(update),
            Some(_) => {}
            None => tracing::debug!(label = %label, "dropping unknown event label"),
        }
    }
    out
}

/// Epoch milliseconds, limited to four-digit years.
fn parse_epoch_millis(raw: &str) -> StrataResult<DateTime<Utc>> {
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .filter(|ts| (0..=9999).contains(&ts.year()))
        .ok_or_else(|| {
            NormalizeError::InvalidField {
                field: HEADER_TIMESTAMP.to_string(),
                value: raw.to_string(),
            }
            .into()
        })
}
