//! Index sink strategies. The engine is written against
//! [`strata_core::traits::IndexSink`]; these are the two shipped strategies.

mod direct;
mod store;

pub use direct::DirectIndexSink;
pub use store::StoreIndexSink;

/// Top-level field carrying the canonical path on every indexed document.
/// Descendant lookups run a prefix query against it.
pub const PATH_FIELD: &str = "_strata_path";

/// Top-level field naming the model that wrote the document, so hits from a
/// `write-index` index map back to their model.
pub const MODEL_FIELD: &str = "_strata_model";
