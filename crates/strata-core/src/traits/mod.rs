//! Collaborator interfaces. The engine only talks to these; concrete
//! clients are constructed by the caller and injected.

mod index_sink;
mod ledger;
mod model;
mod queue;
mod repository;
mod workflow;

pub use index_sink::IndexSink;
pub use ledger::StatusLedger;
pub use model::Model;
pub use queue::EventQueue;
pub use repository::Repository;
pub use workflow::WorkflowRegistry;
