use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of change carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateType {
    Create,
    Update,
    Delete,
    Purge,
    Reindex,
}

impl UpdateType {
    pub const ALL: [UpdateType; 5] = [
        UpdateType::Create,
        UpdateType::Update,
        UpdateType::Delete,
        UpdateType::Purge,
        UpdateType::Reindex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateType::Create => "Create",
            UpdateType::Update => "Update",
            UpdateType::Delete => "Delete",
            UpdateType::Purge => "Purge",
            UpdateType::Reindex => "Reindex",
        }
    }

    /// Delete and Purge remove a resource from the index.
    pub fn is_delete(self) -> bool {
        matches!(self, UpdateType::Delete | UpdateType::Purge)
    }

    /// Map a native repository event label. Accepts plain labels
    /// (`Update`), repository-specific labels (`ResourceModification`), and
    /// full IRIs ending in either (`https://www.w3.org/ns/activitystreams#Update`).
    pub fn from_label(label: &str) -> Option<Self> {
        let local = label
            .rsplit(|c| c == '#' || c == '/')
            .next()
            .unwrap_or(label)
            .trim();
        match local.to_ascii_lowercase().as_str() {
            "create" | "resourcecreation" => Some(UpdateType::Create),
            "update" | "resourcemodification" => Some(UpdateType::Update),
            "delete" | "resourcedeletion" => Some(UpdateType::Delete),
            "purge" | "resourcepurge" => Some(UpdateType::Purge),
            "reindex" => Some(UpdateType::Reindex),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown update type: {s}"))
    }
}
