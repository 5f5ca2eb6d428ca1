//! Bulk recrawl: re-emit synthetic events for a whole subtree.
//!
//! Traversal is depth-first over an explicit stack with one visited set
//! per invocation, so cycles (A contains B, B links back to A) terminate
//! and recursion depth never tracks graph depth. Every emitted event goes
//! through the durable queue; the engine does the rest.

pub mod graph;
mod request;
mod state;

use std::sync::Arc;

use strata_core::config::CrawlConfig;
use strata_core::constants::BINARY_TYPES;
use strata_core::errors::CrawlError;
use strata_core::paths::{canonicalize, expand_iri, is_within_base, metadata_companion};
use strata_core::traits::{EventQueue, Repository};
use strata_core::{Event, StrataResult, UpdateType};
use strata_observability::events;

pub use request::RecrawlRequest;
pub use state::CrawlState;

/// Per-invocation crawl options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOptions {
    /// Relations to traverse in addition to containment.
    pub follow: Vec<String>,
    /// Overwrite pending events instead of leaving them in place.
    pub force: bool,
    /// Only emit the start path.
    pub no_crawl: bool,
    /// Index hint carried by every emitted event.
    pub write_index: Option<String>,
    /// Treat the start path as a binary.
    pub is_binary: bool,
    /// Nodes at this depth are emitted but not expanded.
    pub max_depth: Option<usize>,
}

/// Counters for one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Paths whose graph was fetched.
    pub visited: usize,
    /// Events written to the queue.
    pub emitted: usize,
    /// Paths or events not acted on: beyond the depth limit, missing, or
    /// already pending.
    pub skipped: usize,
    /// Branches abandoned on a malformed graph or repository error.
    pub failed: usize,
}

pub struct Recrawler {
    queue: Arc<dyn EventQueue>,
    repository: Arc<dyn Repository>,
    base_url: String,
    relations: Vec<String>,
}

impl Recrawler {
    pub fn new(
        queue: Arc<dyn EventQueue>,
        repository: Arc<dyn Repository>,
        config: &CrawlConfig,
        base_url: impl Into<String>,
    ) -> Self {
        let mut relations: Vec<String> = Vec::new();
        for relation in config.containment.iter().chain(&config.default_follow) {
            let relation = expand_iri(relation);
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
        Self {
            queue,
            repository,
            base_url: base_url.into(),
            relations,
        }
    }

    /// Start a crawl on the runtime and return immediately.
    pub fn spawn(self: &Arc<Self>, request: RecrawlRequest) -> tokio::task::JoinHandle<()> {
        let crawler = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = crawler.crawl(&request.path, &request.options).await {
                tracing::error!(path = %request.path, error = %e, "recrawl aborted");
            }
        })
    }

    /// Crawl from `path`. Only queue failures abort the crawl.
    pub async fn crawl(&self, path: &str, options: &CrawlOptions) -> StrataResult<CrawlReport> {
        let start = canonicalize(path, &self.base_url);
        let relations = self.relations_for(options);
        let mut state = CrawlState::new();
        let mut report = CrawlReport::default();
        state.discover(&start, 0);

        while let Some((current, depth)) = state.pop() {
            report.visited += 1;
            let is_start = current == start;

            let graph = match self.repository.graph(&current).await {
                Ok(Some(graph)) => graph,
                Ok(None) if is_start => {
                    let event = Event::new(
                        current.clone(),
                        Vec::new(),
                        vec![UpdateType::Reindex, UpdateType::Delete],
                    );
                    self.emit(event, options, &mut report).await?;
                    continue;
                }
                Ok(None) => {
                    tracing::debug!(path = %current, "crawl target vanished");
                    report.skipped += 1;
                    continue;
                }
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(path = %current, error = %e, "abandoning crawl branch");
                    continue;
                }
            };

            let Some(node) = graph::find_node(&graph, &current, &self.base_url) else {
                report.failed += 1;
                let e = CrawlError::PartialGraph {
                    path: current.clone(),
                    reason: "no node describes the resource".to_string(),
                };
                tracing::warn!(path = %current, error = %e, "abandoning crawl branch");
                continue;
            };

            let types = graph::merged_types(&graph);
            let binary = (is_start && options.is_binary)
                || types.iter().any(|t| BINARY_TYPES.contains(&t.as_str()));
            let companion_types: Vec<String> = types
                .iter()
                .filter(|t| !BINARY_TYPES.contains(&t.as_str()))
                .cloned()
                .collect();

            self.emit(Event::reindex(current.clone(), types), options, &mut report)
                .await?;
            if binary {
                let companion = Event::reindex(metadata_companion(&current), companion_types);
                self.emit(companion, options, &mut report).await?;
            }

            if options.no_crawl {
                continue;
            }
            let expand = options.max_depth.map_or(true, |max| depth < max);
            let children = graph::related_ids(node, &relations);
            // Push in reverse so the first-listed child is visited first.
            for child in children.iter().rev() {
                if !is_within_base(child, &self.base_url) {
                    continue;
                }
                let child = canonicalize(child, &self.base_url);
                if expand {
                    state.discover(&child, depth + 1);
                } else if state.mark_visited(&child).is_some() {
                    report.skipped += 1;
                }
            }
        }

        events::crawl_completed(&start, report.visited, report.emitted, report.failed);
        Ok(report)
    }

    fn relations_for(&self, options: &CrawlOptions) -> Vec<String> {
        let mut relations = self.relations.clone();
        for relation in &options.follow {
            let relation = expand_iri(relation);
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
        relations
    }

    async fn emit(
        &self,
        event: Event,
        options: &CrawlOptions,
        report: &mut CrawlReport,
    ) -> StrataResult<()> {
        let event = event.with_write_index(options.write_index.clone());
        let written = if options.force {
            self.queue.enqueue(&event).await?;
            true
        } else {
            self.queue.enqueue_if_absent(&event).await?
        };
        if written {
            report.emitted += 1;
        } else {
            report.skipped += 1;
            tracing::debug!(path = %event.path, "event already pending, left in place");
        }
        Ok(())
    }
}
