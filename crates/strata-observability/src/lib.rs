//! # strata-observability
//!
//! Structured logging for the sync engine. Operators observe outcomes through
//! the status ledger and these logs only.

pub mod tracing_setup;

pub use tracing_setup::events;
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
