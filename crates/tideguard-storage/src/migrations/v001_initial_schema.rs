//! v001: raw_reports, hazard_clusters, cluster_members.

use rusqlite::Connection;

use tideguard_core::errors::TideguardResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TideguardResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS raw_reports (
            id                  TEXT PRIMARY KEY,
            source_type         TEXT NOT NULL,
            submitted_at        TEXT NOT NULL,
            received_at         TEXT NOT NULL,
            lat                 REAL NOT NULL,
            lon                 REAL NOT NULL,
            hazard_type_guess   TEXT NOT NULL,
            base_confidence     REAL NOT NULL,
            credibility_score   REAL NOT NULL,
            self_submitted      INTEGER NOT NULL DEFAULT 0,
            unclassified        INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_reports_self_submitted
            ON raw_reports(self_submitted, submitted_at);

        CREATE TABLE IF NOT EXISTS hazard_clusters (
            id                  TEXT PRIMARY KEY,
            hazard_type         TEXT NOT NULL,
            centroid_lat        REAL NOT NULL,
            centroid_lon        REAL NOT NULL,
            cell_key            TEXT NOT NULL,
            severity            INTEGER NOT NULL,
            status              TEXT NOT NULL,
            fused_confidence    REAL NOT NULL,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL,
            last_report_at      TEXT NOT NULL,
            needs_info_baseline REAL,
            version             INTEGER NOT NULL,
            trace_digest        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_clusters_cell ON hazard_clusters(cell_key);
        CREATE INDEX IF NOT EXISTS idx_clusters_status ON hazard_clusters(status);

        -- report_id as primary key: a report belongs to at most one cluster.
        CREATE TABLE IF NOT EXISTS cluster_members (
            report_id   TEXT PRIMARY KEY,
            cluster_id  TEXT NOT NULL,
            position    INTEGER NOT NULL,
            attached_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            FOREIGN KEY (report_id) REFERENCES raw_reports(id),
            FOREIGN KEY (cluster_id) REFERENCES hazard_clusters(id)
        );

        CREATE INDEX IF NOT EXISTS idx_members_cluster ON cluster_members(cluster_id, position);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
