use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use strata_core::config::IndexConfig;
use strata_core::errors::IndexError;
use strata_core::models::{IndexedDocument, RemoveResult};
use strata_core::paths::is_descendant;
use strata_core::traits::IndexSink;
use strata_core::StrataResult;

use super::{MODEL_FIELD, PATH_FIELD};
use crate::transport::http_client::{index_error, HttpClientConfig};

/// Upper bound on hits returned by one descendant lookup.
const MAX_DESCENDANT_HITS: usize = 10_000;

/// Talks to an Elasticsearch-style REST index. Each model owns an index of
/// the same name; documents are keyed by canonical path.
///
/// Upserts may be redirected to a `write_index`. Every index written to is
/// remembered with its model, so removals and descendant searches cover it.
pub struct DirectIndexSink {
    base_url: String,
    client: Client,
    /// Index name to owning model.
    routes: RwLock<BTreeMap<String, String>>,
}

impl DirectIndexSink {
    pub const CHANNEL: &'static str = "direct";

    /// `models` are the model indices a removal fans out to, joined by the
    /// configured `write_indices`.
    pub fn new(config: &IndexConfig, models: Vec<String>) -> StrataResult<Self> {
        let client = HttpClientConfig::for_index(config).build()?;
        let mut routes: BTreeMap<String, String> = config.write_indices.clone();
        routes.extend(models.into_iter().map(|model| (model.clone(), model)));
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            routes: RwLock::new(routes),
        })
    }

    /// `(index, model)` pairs currently covered by removals and searches.
    pub fn routes(&self) -> Vec<(String, String)> {
        self.routes
            .read()
            .map(|routes| routes.iter().map(|(i, m)| (i.clone(), m.clone())).collect())
            .unwrap_or_default()
    }

    fn remember(&self, index: &str, model: &str) {
        if let Ok(mut routes) = self.routes.write() {
            if !routes.contains_key(index) {
                tracing::debug!(index = %index, model = %model, "tracking write index");
                routes.insert(index.to_string(), model.to_string());
            }
        }
    }

    fn doc_url(&self, index: &str, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, index, encode_id(id))
    }

    fn search_url(&self, indices: &[String]) -> String {
        format!(
            "{}/{}/_search?ignore_unavailable=true",
            self.base_url,
            indices.join(",")
        )
    }

    async fn delete_doc(&self, index: &str, path: &str) -> StrataResult<Value> {
        let url = self.doc_url(index, path);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| index_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            Ok(json!({ "result": "not_found" }))
        } else if status.is_success() {
            Ok(json_body(response).await)
        } else {
            Err(IndexError::Rejected {
                id: path.to_string(),
                status: status.as_u16(),
            }
            .into())
        }
    }
}

fn encode_id(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

/// Attach the path and model fields, wrapping non-object payloads.
fn with_index_fields(document: &Value, path: &str, model: &str) -> Value {
    let mut body = match document {
        Value::Object(_) => document.clone(),
        other => json!({ "document": other }),
    };
    if let Some(map) = body.as_object_mut() {
        map.insert(PATH_FIELD.to_string(), Value::String(path.to_string()));
        map.insert(MODEL_FIELD.to_string(), Value::String(model.to_string()));
    }
    body
}

fn is_not_found(response: &Value) -> bool {
    response.get("result").and_then(Value::as_str) == Some("not_found")
}

async fn json_body(response: reqwest::Response) -> Value {
    response.json::<Value>().await.unwrap_or(Value::Null)
}

#[async_trait]
impl IndexSink for DirectIndexSink {
    fn channel(&self) -> &str {
        Self::CHANNEL
    }

    async fn upsert(
        &self,
        model: &str,
        path: &str,
        document: &Value,
        write_index: Option<&str>,
    ) -> StrataResult<Value> {
        if path.is_empty() {
            return Err(IndexError::MissingIdentifier.into());
        }
        let index = write_index.unwrap_or(model);
        let url = self.doc_url(index, path);
        let response = self
            .client
            .put(&url)
            .json(&with_index_fields(document, path, model))
            .send()
            .await
            .map_err(|e| index_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Rejected {
                id: path.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        self.remember(index, model);
        Ok(json_body(response).await)
    }

    /// One result per model. A model spread over several indices reports
    /// the first index that actually held the document.
    async fn remove(&self, path: &str) -> StrataResult<Vec<RemoveResult>> {
        let mut results: Vec<RemoveResult> = Vec::new();
        for (index, model) in self.routes() {
            let response = self.delete_doc(&index, path).await?;
            match results.iter_mut().find(|r| r.model == model) {
                Some(existing) if is_not_found(&existing.response) => existing.response = response,
                Some(_) => {}
                None => results.push(RemoveResult { model, response }),
            }
        }
        Ok(results)
    }

    async fn find_descendants(&self, path: &str) -> StrataResult<Vec<IndexedDocument>> {
        let routes: BTreeMap<String, String> = self.routes().into_iter().collect();
        if routes.is_empty() {
            return Ok(Vec::new());
        }
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        let query = json!({
            "size": MAX_DESCENDANT_HITS,
            "_source": [PATH_FIELD, MODEL_FIELD],
            "query": { "prefix": { PATH_FIELD: prefix } },
        });
        let indices: Vec<String> = routes.keys().cloned().collect();
        let url = self.search_url(&indices);
        let response = self
            .client
            .post(&url)
            .json(&query)
            .send()
            .await
            .map_err(|e| index_error(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::RequestFailed {
                reason: format!("descendant search returned HTTP {}", status.as_u16()),
            }
            .into());
        }
        let body = json_body(response).await;
        Ok(parse_hits(&body, path, &routes))
    }
}

/// Read `hits.hits[]` into documents strictly below `path`. The model comes
/// from the document's model field, then the index route, then the index.
fn parse_hits(body: &Value, path: &str, routes: &BTreeMap<String, String>) -> Vec<IndexedDocument> {
    let mut docs: Vec<IndexedDocument> = Vec::new();
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for hit in hits {
        let Some(index) = hit.get("_index").and_then(Value::as_str) else {
            continue;
        };
        let Some(id) = hit
            .pointer(&format!("/_source/{PATH_FIELD}"))
            .and_then(Value::as_str)
            .or_else(|| hit.get("_id").and_then(Value::as_str))
        else {
            continue;
        };
        if !is_descendant(id, path) {
            continue;
        }
        let model = hit
            .pointer(&format!("/_source/{MODEL_FIELD}"))
            .and_then(Value::as_str)
            .or_else(|| routes.get(index).map(String::as_str))
            .unwrap_or(index);
        let doc = IndexedDocument {
            id: id.to_string(),
            model: model.to_string(),
        };
        if !docs.contains(&doc) {
            docs.push(doc);
        }
    }
    docs
}
