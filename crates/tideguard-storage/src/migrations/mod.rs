//! Versioned schema migrations, tracked in `schema_version`.

mod v001_initial_schema;
mod v002_decisions_and_events;

use rusqlite::{params, Connection};

use tideguard_core::errors::{StorageError, TideguardResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> TideguardResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_initial_schema::migrate),
    (2, v002_decisions_and_events::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 2;

/// Apply every migration newer than the recorded schema version.
/// Each migration runs in its own transaction together with its version row.
pub fn run_migrations(conn: &Connection) -> TideguardResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    let mut applied = 0;
    for (version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        migrate(&tx).map_err(|e| migration_err(*version, e.to_string()))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![version],
        )
        .map_err(|e| migration_err(*version, e.to_string()))?;
        tx.commit()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        applied += 1;
        tracing::debug!(version, "applied migration");
    }
    if applied > 0 {
        tracing::info!(applied, schema_version = LATEST_VERSION, "storage schema migrated");
    }
    Ok(applied)
}

/// Highest applied migration, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> TideguardResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

fn migration_err(version: u32, reason: String) -> tideguard_core::TideguardError {
    StorageError::MigrationFailed { version, reason }.into()
}
