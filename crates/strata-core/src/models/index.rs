use serde::{Deserialize, Serialize};

/// A document currently present in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Canonical path the document was indexed under.
    pub id: String,
    /// Model (index) holding the document.
    pub model: String,
}

/// Outcome of removing one path from one model's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveResult {
    pub model: String,
    pub response: serde_json::Value,
}
