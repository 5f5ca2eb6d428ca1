//! In-memory collaborator fakes. Each records the calls it receives so
//! tests can assert on what the engine did, not just what it stored.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use strata_core::errors::{CrawlError, IndexError, RepositoryError, StorageError};
use strata_core::models::{FetchResponse, IndexedDocument, RemoveResult, TransformTarget};
use strata_core::paths::is_descendant;
use strata_core::traits::{IndexSink, Repository, WorkflowRegistry};
use strata_core::StrataResult;

use crate::FIXTURE_BASE_URL;

// ─── Repository ──────────────────────────────────────────────────────────

/// Repository fake. Graphs, HEAD types and rendered responses are seeded
/// per path; anything unseeded is absent (404).
#[derive(Default)]
pub struct FakeRepository {
    graphs: Mutex<HashMap<String, Value>>,
    malformed: Mutex<HashSet<String>>,
    heads: Mutex<HashMap<String, Vec<String>>>,
    failing_heads: Mutex<HashSet<String>>,
    timing_out: Mutex<HashSet<String>>,
    responses: Mutex<HashMap<(String, String), (u16, Value)>>,
    graph_calls: Mutex<Vec<String>>,
    head_calls: Mutex<Vec<String>>,
    fetch_calls: Mutex<Vec<(String, String)>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(self, path: &str, graph: Value) -> Self {
        self.graphs.lock().unwrap().insert(path.to_string(), graph);
        self
    }

    /// `graph(path)` fails with a partial-graph error.
    pub fn with_malformed_graph(self, path: &str) -> Self {
        self.malformed.lock().unwrap().insert(path.to_string());
        self
    }

    pub fn with_head(self, path: &str, types: &[&str]) -> Self {
        self.heads
            .lock()
            .unwrap()
            .insert(path.to_string(), types.iter().map(|t| t.to_string()).collect());
        self
    }

    /// `head(path)` fails with a network error.
    pub fn with_failing_head(self, path: &str) -> Self {
        self.failing_heads.lock().unwrap().insert(path.to_string());
        self
    }

    /// While set, `fetch(path)` fails with a timeout.
    pub fn set_timing_out(&self, path: &str, timing_out: bool) {
        let mut paths = self.timing_out.lock().unwrap();
        if timing_out {
            paths.insert(path.to_string());
        } else {
            paths.remove(path);
        }
    }

    /// Seed the direct (content-negotiated) rendering of `path`.
    pub fn with_document(self, path: &str, status: u16, body: Value) -> Self {
        self.with_transform(path, "", status, body)
    }

    /// Seed the rendering of `path` through a transform endpoint.
    pub fn with_transform(self, path: &str, endpoint: &str, status: u16, body: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((path.to_string(), endpoint.to_string()), (status, body));
        self
    }

    pub fn graph_calls(&self) -> Vec<String> {
        self.graph_calls.lock().unwrap().clone()
    }

    pub fn head_calls(&self) -> Vec<String> {
        self.head_calls.lock().unwrap().clone()
    }

    /// `(path, endpoint)` per fetch; the endpoint is empty for direct fetches.
    pub fn fetch_calls(&self) -> Vec<(String, String)> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for FakeRepository {
    async fn head(&self, path: &str) -> StrataResult<Option<Vec<String>>> {
        self.head_calls.lock().unwrap().push(path.to_string());
        if self.failing_heads.lock().unwrap().contains(path) {
            return Err(RepositoryError::NetworkError {
                url: format!("{FIXTURE_BASE_URL}{path}"),
                reason: "connection refused".to_string(),
            }
            .into());
        }
        Ok(self.heads.lock().unwrap().get(path).cloned())
    }

    async fn fetch(&self, path: &str, target: &TransformTarget) -> StrataResult<FetchResponse> {
        let key = (path.to_string(), target.cache_key().to_string());
        self.fetch_calls.lock().unwrap().push(key.clone());
        let url = match &target.endpoint {
            Some(endpoint) => format!("{FIXTURE_BASE_URL}{path}/{endpoint}"),
            None => format!("{FIXTURE_BASE_URL}{path}"),
        };
        if self.timing_out.lock().unwrap().contains(path) {
            return Err(RepositoryError::Timeout { url }.into());
        }
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or((404, Value::Null));
        Ok(FetchResponse { status, body, url })
    }

    async fn graph(&self, path: &str) -> StrataResult<Option<Value>> {
        self.graph_calls.lock().unwrap().push(path.to_string());
        if self.malformed.lock().unwrap().contains(path) {
            return Err(CrawlError::PartialGraph {
                path: path.to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            }
            .into());
        }
        Ok(self.graphs.lock().unwrap().get(path).cloned())
    }
}

// ─── Index sink ──────────────────────────────────────────────────────────

/// A recorded upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub model: String,
    pub path: String,
    pub document: Value,
    pub write_index: Option<String>,
}

/// Index sink fake holding documents in memory, keyed by `(model, path)`.
pub struct RecordingIndexSink {
    channel: String,
    documents: Mutex<BTreeMap<(String, String), Value>>,
    upserts: Mutex<Vec<Upsert>>,
    removals: Mutex<Vec<String>>,
    rejected_paths: Mutex<HashSet<String>>,
    unavailable: Mutex<bool>,
    timing_out: Mutex<bool>,
}

impl RecordingIndexSink {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            documents: Mutex::new(BTreeMap::new()),
            upserts: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
            rejected_paths: Mutex::new(HashSet::new()),
            unavailable: Mutex::new(false),
            timing_out: Mutex::new(false),
        }
    }

    /// Pre-index a document without recording an upsert.
    pub fn with_document(self, model: &str, path: &str) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert((model.to_string(), path.to_string()), json!({ "seeded": true }));
        self
    }

    /// Every write or removal for `path` is rejected by the index.
    pub fn rejecting(self, path: &str) -> Self {
        self.rejected_paths.lock().unwrap().insert(path.to_string());
        self
    }

    /// Upserts fail with a storage error, as a store-backed sink does when
    /// its database is unavailable.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Upserts fail with an index timeout.
    pub fn set_timing_out(&self, timing_out: bool) {
        *self.timing_out.lock().unwrap() = timing_out;
    }

    pub fn upserts(&self) -> Vec<Upsert> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<String> {
        self.removals.lock().unwrap().clone()
    }

    pub fn document(&self, model: &str, path: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(&(model.to_string(), path.to_string()))
            .cloned()
    }

    pub fn indexed_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .documents
            .lock()
            .unwrap()
            .keys()
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    fn check_rejected(&self, path: &str) -> StrataResult<()> {
        if self.rejected_paths.lock().unwrap().contains(path) {
            return Err(IndexError::Rejected {
                id: path.to_string(),
                status: 400,
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl IndexSink for RecordingIndexSink {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn upsert(
        &self,
        model: &str,
        path: &str,
        document: &Value,
        write_index: Option<&str>,
    ) -> StrataResult<Value> {
        if *self.unavailable.lock().unwrap() {
            return Err(StorageError::ConnectionUnavailable {
                details: "outbox database is locked".to_string(),
            }
            .into());
        }
        if *self.timing_out.lock().unwrap() {
            return Err(IndexError::Timeout {
                url: format!("http://index.test/{model}/_doc"),
            }
            .into());
        }
        self.check_rejected(path)?;
        self.upserts.lock().unwrap().push(Upsert {
            model: model.to_string(),
            path: path.to_string(),
            document: document.clone(),
            write_index: write_index.map(String::from),
        });
        self.documents
            .lock()
            .unwrap()
            .insert((model.to_string(), path.to_string()), document.clone());
        Ok(json!({ "result": "created", "_id": path }))
    }

    async fn remove(&self, path: &str) -> StrataResult<Vec<RemoveResult>> {
        self.removals.lock().unwrap().push(path.to_string());
        self.check_rejected(path)?;
        let mut documents = self.documents.lock().unwrap();
        let models: Vec<String> = documents
            .keys()
            .filter(|(_, p)| p == path)
            .map(|(m, _)| m.clone())
            .collect();
        Ok(models
            .into_iter()
            .map(|model| {
                documents.remove(&(model.clone(), path.to_string()));
                RemoveResult {
                    model,
                    response: json!({ "result": "deleted" }),
                }
            })
            .collect())
    }

    async fn find_descendants(&self, path: &str) -> StrataResult<Vec<IndexedDocument>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .keys()
            .filter(|(_, p)| is_descendant(p, path))
            .map(|(model, id)| IndexedDocument {
                id: id.clone(),
                model: model.clone(),
            })
            .collect())
    }
}

// ─── Workflows ───────────────────────────────────────────────────────────

/// Workflow names bound to exact paths.
#[derive(Debug, Default)]
pub struct StaticWorkflows {
    bindings: HashMap<String, Vec<String>>,
}

impl StaticWorkflows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, path: &str, workflow: &str) -> Self {
        self.bindings
            .entry(path.to_string())
            .or_default()
            .push(workflow.to_string());
        self
    }
}

impl WorkflowRegistry for StaticWorkflows {
    fn workflows_for(&self, path: &str) -> Vec<String> {
        self.bindings.get(path).cloned().unwrap_or_default()
    }
}
