//! v002: validation_decisions audit trail, event_log outbox.

use rusqlite::Connection;

use tideguard_core::errors::TideguardResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TideguardResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS validation_decisions (
            id                              TEXT PRIMARY KEY,
            cluster_id                      TEXT NOT NULL,
            action                          TEXT NOT NULL,
            notes                           TEXT,
            reviewer_id                     TEXT NOT NULL,
            decided_at                      TEXT NOT NULL,
            from_status                     TEXT NOT NULL,
            to_status                       TEXT NOT NULL,
            fused_confidence_at_decision    REAL NOT NULL,
            FOREIGN KEY (cluster_id) REFERENCES hazard_clusters(id)
        );

        CREATE INDEX IF NOT EXISTS idx_decisions_cluster
            ON validation_decisions(cluster_id, decided_at);

        CREATE TABLE IF NOT EXISTS event_log (
            sequence    INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id    TEXT NOT NULL UNIQUE,
            kind        TEXT NOT NULL,
            subject_id  TEXT NOT NULL,
            version     INTEGER NOT NULL,
            occurred_at TEXT NOT NULL,
            payload     TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
