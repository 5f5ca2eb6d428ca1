//! Error taxonomy. One enum per subsystem, aggregated by [`StrataError`].

mod config_error;
mod crawl_error;
mod index_error;
mod normalize_error;
mod repository_error;
mod storage_error;

pub use config_error::ConfigError;
pub use crawl_error::CrawlError;
pub use index_error::IndexError;
pub use normalize_error::NormalizeError;
pub use repository_error::RepositoryError;
pub use storage_error::StorageError;

/// Result alias used across the workspace.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error for every Strata operation.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl StrataError {
    /// Whether this failure is infrastructure trouble worth retrying: the
    /// queue/ledger store, or an outbound request that timed out.
    ///
    /// Transient errors escape a reconciliation call so the poll loop backs
    /// off and redelivers the unacknowledged event. Everything else is a
    /// per-event outcome recorded in the status ledger.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StrataError::Storage(_)
                | StrataError::Repository(RepositoryError::Timeout { .. })
                | StrataError::Index(IndexError::Timeout { .. })
        )
    }

    /// Render the error with its full source chain, one cause per line.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
