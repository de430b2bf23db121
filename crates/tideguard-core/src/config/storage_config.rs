use serde::{Deserialize, Serialize};

use super::defaults;

/// Storage subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Enable WAL journal mode (file-backed databases only).
    pub wal_mode: bool,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Read connections for file-backed databases (clamped to 1..=8).
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            wal_mode: defaults::DEFAULT_WAL_MODE,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
        }
    }
}
