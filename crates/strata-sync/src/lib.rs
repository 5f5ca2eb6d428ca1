//! # strata-sync
//!
//! The change-propagation engine. Keeps a search index and the status ledger
//! consistent with a hierarchical content repository.
//!
//! Event intake ([`normalizer`]) feeds the durable queue; the
//! [`engine::SyncEngine`] drains it one event at a time through the
//! [`reconcile`] pipeline, which invokes [`cascade`] invalidation when a
//! resource becomes inaccessible. [`crawl`] re-emits synthetic events for a
//! whole subtree through the same queue.

pub mod cascade;
pub mod crawl;
pub mod engine;
pub mod normalizer;
pub mod reconcile;
pub mod registry;
pub mod sinks;
pub mod transport;

use std::sync::Arc;

use strata_core::traits::{EventQueue, IndexSink, Repository, StatusLedger, WorkflowRegistry};

pub use cascade::{CascadeInvalidator, CascadeReport};
pub use crawl::{CrawlOptions, CrawlReport, RecrawlRequest, Recrawler};
pub use engine::{PollOutcome, SyncEngine};
pub use normalizer::{BusMessage, EventNormalizer};
pub use reconcile::{ReconcileReport, Reconciler};
pub use registry::{ConfiguredModel, ConfiguredWorkflows, ModelRegistry};

/// Every collaborator the engine talks to, constructed by the caller.
#[derive(Clone)]
pub struct SyncContext {
    pub queue: Arc<dyn EventQueue>,
    pub ledger: Arc<dyn StatusLedger>,
    pub repository: Arc<dyn Repository>,
    pub sink: Arc<dyn IndexSink>,
    pub models: Arc<ModelRegistry>,
    pub workflows: Arc<dyn WorkflowRegistry>,
}
