//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL journal (file-backed only), NORMAL sync, configurable busy_timeout,
//! foreign_keys ON.

use rusqlite::Connection;

use tideguard_core::config::StorageConfig;
use tideguard_core::errors::TideguardResult;

use crate::to_storage_err;

/// Apply the write-side pragmas.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> TideguardResult<()> {
    if config.wal_mode {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    conn.execute_batch(&format!(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        PRAGMA foreign_keys = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection, config: &StorageConfig) -> TideguardResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA busy_timeout = {};
        PRAGMA query_only = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> TideguardResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
