//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Option<Arc<ReadPool>>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    ///
    /// The writer is opened first so the file and its WAL exist before the
    /// read-only connections attach.
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let writer = Arc::new(WriteConnection::open(path, config.busy_timeout_ms)?);
        let readers = Arc::new(ReadPool::open(
            path,
            config.read_pool_size,
            config.busy_timeout_ms,
        )?);
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing). Reads go through the writer
    /// because separate in-memory connections are separate databases.
    pub fn open_in_memory() -> StrataResult<Self> {
        Ok(Self {
            writer: Arc::new(WriteConnection::open_in_memory()?),
            readers: None,
            db_path: None,
        })
    }
}
