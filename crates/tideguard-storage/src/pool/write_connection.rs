//! Single write connection behind a mutex. All writes are serialized here.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use tideguard_core::config::StorageConfig;
use tideguard_core::errors::{StorageError, TideguardResult};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, config: &StorageConfig) -> TideguardResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> TideguardResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and run a closure with the connection.
    pub fn with_conn_sync<F, T>(&self, f: F) -> TideguardResult<T>
    where
        F: FnOnce(&Connection) -> TideguardResult<T>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&guard)
    }
}
