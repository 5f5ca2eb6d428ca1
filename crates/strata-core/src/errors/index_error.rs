/// Search index sink errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index request to {url} timed out")]
    Timeout { url: String },

    #[error("index request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("index rejected document {id}: HTTP {status}")]
    Rejected { id: String, status: u16 },

    #[error("document has no identifier")]
    MissingIdentifier,
}
