//! # strata-storage
//!
//! SQLite persistence for the durable event queue, the status ledger, and
//! the store-mediated index outbox. One serialized write connection, a
//! small read pool for file-backed databases, versioned migrations.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;
pub use queries::outbox_ops::{OutboxEntry, OutboxOperation};

use strata_core::errors::{StorageError, StrataError};

/// Wrap a message as a storage error.
pub(crate) fn to_storage_err(message: String) -> StrataError {
    StorageError::SqliteError { message }.into()
}
