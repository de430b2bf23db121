//! Round-robin pool of read-only connections. Under WAL they never block on
//! the writer.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use tideguard_core::config::StorageConfig;
use tideguard_core::errors::{StorageError, TideguardResult};

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

/// Maximum number of read connections.
const MAX_POOL_SIZE: usize = 8;

pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open `config.read_pool_size` read-only connections, clamped to 1..=8.
    pub fn open(path: &Path, config: &StorageConfig) -> TideguardResult<Self> {
        let size = config.read_pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn, config)?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Run a closure with the next connection (round-robin).
    pub fn with_conn<F, T>(&self, f: F) -> TideguardResult<T>
    where
        F: FnOnce(&Connection) -> TideguardResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx]
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}
