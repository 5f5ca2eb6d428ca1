use std::collections::hash_map::Entry;
use std::collections::HashMap;

use strata_core::models::{FetchResponse, TransformTarget};
use strata_core::traits::Repository;
use strata_core::StrataResult;

/// Rendered representations fetched during one reconciliation call, keyed
/// by transform endpoint. Models sharing a target share one fetch.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: HashMap<String, FetchResponse>,
}

impl FetchCache {
    pub async fn get_or_fetch(
        &mut self,
        repository: &dyn Repository,
        path: &str,
        target: &TransformTarget,
    ) -> StrataResult<&FetchResponse> {
        match self.entries.entry(target.cache_key().to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let response = repository.fetch(path, target).await?;
                Ok(entry.insert(response))
            }
        }
    }
}
