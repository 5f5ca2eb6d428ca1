use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Event, UpdateType};

/// Terminal outcome of reconciling one path against one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Updated,
    Deleted,
    Ignored,
    Error,
}

impl StatusAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusAction::Updated => "updated",
            StatusAction::Deleted => "deleted",
            StatusAction::Ignored => "ignored",
            StatusAction::Error => "error",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated" => Ok(StatusAction::Updated),
            "deleted" => Ok(StatusAction::Deleted),
            "ignored" => Ok(StatusAction::Ignored),
            "error" => Ok(StatusAction::Error),
            other => Err(format!("unknown status action: {other}")),
        }
    }
}

/// One status ledger row. Unique by `(path, model)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub path: String,
    /// Empty for outcomes that bind to no model.
    pub model: String,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub container_types: Vec<String>,
    pub update_types: Vec<UpdateType>,
    pub workflow_types: Vec<String>,
    pub action: StatusAction,
    pub message: String,
    pub db_response: serde_json::Value,
    pub transform_service: String,
    pub source: String,
    /// Time the row was last written. Set by the ledger.
    pub updated: Option<DateTime<Utc>>,
}

impl StatusRecord {
    /// Start a record for `event` against `model`. Provenance fields are
    /// copied from the event; the caller fills in the outcome.
    pub fn for_event(event: &Event, model: &str, action: StatusAction) -> Self {
        Self {
            path: event.path.clone(),
            model: model.to_string(),
            event_id: event.event_id.clone(),
            timestamp: event.timestamp,
            container_types: event.container_types.clone(),
            update_types: event.update_types.clone(),
            workflow_types: Vec::new(),
            action,
            message: String::new(),
            db_response: serde_json::Value::Null,
            transform_service: String::new(),
            source: String::new(),
            updated: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_workflows(mut self, workflows: &[String]) -> Self {
        self.workflow_types = workflows.to_vec();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_response(mut self, db_response: serde_json::Value) -> Self {
        self.db_response = db_response;
        self
    }

    pub fn with_transform_service(mut self, url: &str) -> Self {
        self.transform_service = url.to_string();
        self
    }
}
