//! Recrawl trigger parsing.

use strata_core::errors::NormalizeError;
use strata_core::paths::expand_iri;
use strata_core::StrataResult;

use super::CrawlOptions;

/// A recrawl trigger: a start path plus options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecrawlRequest {
    pub path: String,
    pub options: CrawlOptions,
}

impl RecrawlRequest {
    pub fn new(path: impl Into<String>, options: CrawlOptions) -> Self {
        Self { path: path.into(), options }
    }

    /// Parse trigger query parameters: `force`, `follow` (comma-separated
    /// relations), `no-crawl`, `write-index`, `is-binary`, `depth`.
    /// Flags given without a value count as set. Unknown keys are ignored.
    pub fn from_query<'a, I>(path: &str, params: I) -> StrataResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = CrawlOptions::default();
        for (key, value) in params {
            let value = value.trim();
            match key.trim() {
                "force" => options.force = flag(key, value)?,
                "no-crawl" => options.no_crawl = flag(key, value)?,
                "is-binary" => options.is_binary = flag(key, value)?,
                "write-index" => {
                    options.write_index = (!value.is_empty()).then(|| value.to_string())
                }
                "follow" => options.follow.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(expand_iri),
                ),
                "depth" => {
                    options.max_depth = Some(value.parse().map_err(|_| invalid(key, value))?)
                }
                other => tracing::debug!(param = %other, "ignoring unknown recrawl parameter"),
            }
        }
        Ok(Self::new(path, options))
    }
}

fn flag(key: &str, value: &str) -> StrataResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> strata_core::StrataError {
    NormalizeError::InvalidField {
        field: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
