//! Connection pool managing the write connection and read connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use tideguard_core::config::StorageConfig;
use tideguard_core::errors::TideguardResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus, for file-backed databases, a read pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` for in-memory databases: separate in-memory connections would
    /// each see their own empty database.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a pool for the given database file. `prepare` runs on the writer
    /// before any read-only connection attaches, so the schema exists first.
    pub fn open<F>(path: &Path, config: &StorageConfig, prepare: F) -> TideguardResult<Self>
    where
        F: FnOnce(&Connection) -> TideguardResult<()>,
    {
        let writer = WriteConnection::open(path, config)?;
        writer.with_conn_sync(prepare)?;
        let readers = ReadPool::open(path, config)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (tests, ephemeral engines).
    pub fn open_in_memory<F>(config: &StorageConfig, prepare: F) -> TideguardResult<Self>
    where
        F: FnOnce(&Connection) -> TideguardResult<()>,
    {
        let writer = WriteConnection::open_in_memory(config)?;
        writer.with_conn_sync(prepare)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
        })
    }
}
