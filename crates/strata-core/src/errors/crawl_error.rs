/// Bulk recrawl errors.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Malformed or unparseable graph fragment. Abandons one branch only.
    #[error("partial graph at {path}: {reason}")]
    PartialGraph { path: String, reason: String },
}
