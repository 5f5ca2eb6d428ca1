//! Single write connection behind `tokio::sync::Mutex`.
//! Serialized writes, so upserts by natural key never interleave.

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use strata_core::config::defaults::DEFAULT_BUSY_TIMEOUT_MS;
use strata_core::errors::{StorageError, StrataResult};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// A single write connection protected by an async mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, busy_timeout_ms: u32) -> StrataResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StrataResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, DEFAULT_BUSY_TIMEOUT_MS)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }

    /// Non-blocking access for startup work (migrations) that runs before
    /// the connection is shared. Fails instead of waiting if the lock is held,
    /// so it is safe to call from inside a runtime.
    pub fn with_conn_sync<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        let guard = self
            .conn
            .try_lock()
            .map_err(|e| StorageError::ConnectionUnavailable {
                details: e.to_string(),
            })?;
        f(&guard)
    }
}
