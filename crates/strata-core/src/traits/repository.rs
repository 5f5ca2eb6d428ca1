use async_trait::async_trait;

use crate::errors::StrataResult;
use crate::models::{FetchResponse, TransformTarget};

/// Read access to the content repository. All calls run in direct
/// (superuser) mode.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Metadata probe. `None` when the resource does not exist, otherwise
    /// the type IRIs advertised by the resource.
    async fn head(&self, path: &str) -> StrataResult<Option<Vec<String>>>;

    /// Fetch a rendered representation. Non-success statuses are returned,
    /// not raised; only transport failures are errors.
    async fn fetch(&self, path: &str, target: &TransformTarget) -> StrataResult<FetchResponse>;

    /// Fetch the resource's metadata graph as JSON-LD. `None` when absent.
    /// Unparseable payloads are `CrawlError::PartialGraph`.
    async fn graph(&self, path: &str) -> StrataResult<Option<serde_json::Value>>;
}
