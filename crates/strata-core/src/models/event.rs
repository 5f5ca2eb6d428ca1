use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UpdateType;

/// A pending change notification, one queue row per path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    /// Canonical, repository-root-relative path.
    pub path: String,
    /// Type IRIs. Empty for most delete notifications.
    pub container_types: Vec<String>,
    pub update_types: Vec<UpdateType>,
    /// Advisory target index, set by recrawls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_index: Option<String>,
}

impl Event {
    /// A fresh event with a random id stamped now.
    pub fn new(
        path: impl Into<String>,
        container_types: Vec<String>,
        update_types: Vec<UpdateType>,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            path: path.into(),
            container_types,
            update_types,
            write_index: None,
        }
    }

    /// A synthetic reindex event.
    pub fn reindex(path: impl Into<String>, container_types: Vec<String>) -> Self {
        Self::new(path, container_types, vec![UpdateType::Reindex])
    }

    pub fn with_write_index(mut self, write_index: Option<String>) -> Self {
        self.write_index = write_index;
        self
    }

    /// Whether any update type removes the resource.
    pub fn is_delete(&self) -> bool {
        self.update_types.iter().any(|u| u.is_delete())
    }

    pub fn has_type(&self, type_iri: &str) -> bool {
        self.container_types.iter().any(|t| t == type_iri)
    }
}
