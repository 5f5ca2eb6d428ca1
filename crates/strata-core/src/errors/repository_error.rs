/// Content repository client errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("network error for {url}: {reason}")]
    NetworkError { url: String, reason: String },

    #[error("unexpected HTTP {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("malformed payload from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },
}
