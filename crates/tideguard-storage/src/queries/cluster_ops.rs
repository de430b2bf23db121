//! Cluster rows, membership, and the versioned compare-and-set commit.

use rusqlite::{params, Connection, Row};

use tideguard_core::errors::{ConflictError, TideguardError, TideguardResult};
use tideguard_core::models::{
    ClusterId, ClusterStatus, GeoPoint, GridCell, HazardCluster, RawReport, ReportId,
};

use super::report_ops::{cluster_of_report, query_reports, REPORT_COLUMNS};
use super::{fmt_ts, in_transaction, parse_ts, OptionalRow};
use crate::{corrupt_row, to_storage_err};

const TABLE: &str = "hazard_clusters";

const CLUSTER_COLUMNS: &str = "id, hazard_type, centroid_lat, centroid_lon, cell_key, severity, \
     status, fused_confidence, created_at, updated_at, last_report_at, needs_info_baseline, \
     version, trace_digest";

/// Insert a new cluster and its membership rows in one transaction.
pub fn insert_cluster(conn: &Connection, cluster: &HazardCluster) -> TideguardResult<()> {
    in_transaction(conn, "insert_cluster", |tx| {
        tx.execute(
            "INSERT INTO hazard_clusters (
                id, hazard_type, centroid_lat, centroid_lon, cell_key, severity,
                status, fused_confidence, created_at, updated_at, last_report_at,
                needs_info_baseline, version, trace_digest
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                cluster.id.as_str(),
                cluster.hazard_type,
                cluster.centroid.lat,
                cluster.centroid.lon,
                cluster.cell.key(),
                cluster.severity,
                cluster.status.as_str(),
                cluster.fused_confidence,
                fmt_ts(&cluster.created_at),
                fmt_ts(&cluster.updated_at),
                fmt_ts(&cluster.last_report_at),
                cluster.needs_info_baseline,
                cluster.version as i64,
                cluster.trace_digest,
            ],
        )
        .map_err(|e| to_storage_err(format!("insert cluster {}: {e}", cluster.id)))?;
        attach_new_members(tx, cluster)
    })
}

/// Compare-and-set update of a cluster row plus any newly attached members.
pub fn commit_cluster(
    conn: &Connection,
    cluster: &HazardCluster,
    expected_version: u64,
) -> TideguardResult<()> {
    in_transaction(conn, "commit_cluster", |tx| {
        update_cluster_row(tx, cluster, expected_version, None)?;
        attach_new_members(tx, cluster)
    })
}

/// Versioned update shared by cluster and decision commits.
///
/// Matches on `id` and `version`, and on `status` when `expected_status` is
/// given. Zero affected rows means the caller's view is stale: terminal
/// status, lost race, or a missing cluster, in that order of precedence.
pub(crate) fn update_cluster_row(
    conn: &Connection,
    cluster: &HazardCluster,
    expected_version: u64,
    expected_status: Option<ClusterStatus>,
) -> TideguardResult<()> {
    if cluster.version <= expected_version {
        return Err(TideguardError::ConcurrencyError(format!(
            "cluster {} committed without a version bump ({} -> {})",
            cluster.id, expected_version, cluster.version
        )));
    }
    let changed = conn
        .execute(
            "UPDATE hazard_clusters SET
                hazard_type = ?1, centroid_lat = ?2, centroid_lon = ?3, severity = ?4,
                status = ?5, fused_confidence = ?6, updated_at = ?7, last_report_at = ?8,
                needs_info_baseline = ?9, version = ?10, trace_digest = ?11
             WHERE id = ?12 AND version = ?13 AND (?14 IS NULL OR status = ?14)",
            params![
                cluster.hazard_type,
                cluster.centroid.lat,
                cluster.centroid.lon,
                cluster.severity,
                cluster.status.as_str(),
                cluster.fused_confidence,
                fmt_ts(&cluster.updated_at),
                fmt_ts(&cluster.last_report_at),
                cluster.needs_info_baseline,
                cluster.version as i64,
                cluster.trace_digest,
                cluster.id.as_str(),
                expected_version as i64,
                expected_status.map(ClusterStatus::as_str),
            ],
        )
        .map_err(|e| to_storage_err(format!("update cluster {}: {e}", cluster.id)))?;

    if changed == 1 {
        return Ok(());
    }
    match current_status(conn, &cluster.id)? {
        None => Err(TideguardError::ClusterNotFound {
            id: cluster.id.to_string(),
        }),
        Some(status) if status.is_terminal() && expected_status.is_some() => {
            Err(ConflictError::TerminalStatus {
                cluster_id: cluster.id.to_string(),
                status: status.to_string(),
            }
            .into())
        }
        Some(_) => Err(ConflictError::LostRace {
            cluster_id: cluster.id.to_string(),
            expected_version,
        }
        .into()),
    }
}

fn current_status(conn: &Connection, id: &ClusterId) -> TideguardResult<Option<ClusterStatus>> {
    let status: Option<String> = conn
        .query_row(
            "SELECT status FROM hazard_clusters WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    status
        .map(|s| {
            s.parse()
                .map_err(|e| corrupt_row(TABLE, format!("cluster {id}: {e}")))
        })
        .transpose()
}

/// Insert membership rows for members not yet stored, keeping their index
/// in `member_report_ids` as the position.
fn attach_new_members(conn: &Connection, cluster: &HazardCluster) -> TideguardResult<()> {
    for (position, report_id) in cluster.member_report_ids.iter().enumerate() {
        match cluster_of_report(conn, report_id)? {
            Some(owner) if owner == cluster.id => continue,
            Some(owner) => {
                return Err(ConflictError::AlreadyAttached {
                    report_id: report_id.to_string(),
                    cluster_id: owner.to_string(),
                }
                .into())
            }
            None => {}
        }
        conn.execute(
            "INSERT INTO cluster_members (report_id, cluster_id, position) VALUES (?1, ?2, ?3)",
            params![report_id.as_str(), cluster.id.as_str(), position as i64],
        )
        .map_err(|e| {
            to_storage_err(format!(
                "attach report {report_id} to cluster {}: {e}",
                cluster.id
            ))
        })?;
    }
    Ok(())
}

pub fn get_cluster(conn: &Connection, id: &ClusterId) -> TideguardResult<Option<HazardCluster>> {
    let row = conn
        .query_row(
            &format!("SELECT {CLUSTER_COLUMNS} FROM hazard_clusters WHERE id = ?1"),
            params![id.as_str()],
            ClusterRow::from_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    match row {
        Some(row) => Ok(Some(hydrate(conn, row)?)),
        None => Ok(None),
    }
}

pub fn clusters_in_cell(conn: &Connection, cell: &GridCell) -> TideguardResult<Vec<HazardCluster>> {
    let cell_key = cell.key();
    query_clusters(
        conn,
        &format!(
            "SELECT {CLUSTER_COLUMNS} FROM hazard_clusters WHERE cell_key = ?1
             ORDER BY created_at, id"
        ),
        &[&cell_key],
    )
}

pub fn list_clusters(
    conn: &Connection,
    status: Option<ClusterStatus>,
) -> TideguardResult<Vec<HazardCluster>> {
    match status {
        Some(status) => query_clusters(
            conn,
            &format!(
                "SELECT {CLUSTER_COLUMNS} FROM hazard_clusters WHERE status = ?1
                 ORDER BY created_at, id"
            ),
            &[&status.as_str()],
        ),
        None => query_clusters(
            conn,
            &format!("SELECT {CLUSTER_COLUMNS} FROM hazard_clusters ORDER BY created_at, id"),
            &[],
        ),
    }
}

/// Member reports in insertion order.
pub fn cluster_members(conn: &Connection, id: &ClusterId) -> TideguardResult<Vec<RawReport>> {
    let cluster_id = id.as_str();
    query_reports(
        conn,
        &format!(
            "SELECT {REPORT_COLUMNS} FROM cluster_members m
             JOIN raw_reports r ON r.id = m.report_id
             WHERE m.cluster_id = ?1
             ORDER BY m.position"
        ),
        &[&cluster_id],
    )
}

fn member_ids(conn: &Connection, id: &str) -> TideguardResult<Vec<ReportId>> {
    let mut stmt = conn
        .prepare("SELECT report_id FROM cluster_members WHERE cluster_id = ?1 ORDER BY position")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let ids = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?
        .map(|r| r.map(ReportId))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(ids)
}

fn query_clusters(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> TideguardResult<Vec<HazardCluster>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(args, ClusterRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(|row| hydrate(conn, row)).collect()
}

fn hydrate(conn: &Connection, row: ClusterRow) -> TideguardResult<HazardCluster> {
    let members = member_ids(conn, &row.id)?;
    row.into_cluster(members)
}

struct ClusterRow {
    id: String,
    hazard_type: String,
    centroid_lat: f64,
    centroid_lon: f64,
    cell_key: String,
    severity: u8,
    status: String,
    fused_confidence: f64,
    created_at: String,
    updated_at: String,
    last_report_at: String,
    needs_info_baseline: Option<f64>,
    version: i64,
    trace_digest: String,
}

impl ClusterRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            hazard_type: row.get(1)?,
            centroid_lat: row.get(2)?,
            centroid_lon: row.get(3)?,
            cell_key: row.get(4)?,
            severity: row.get(5)?,
            status: row.get(6)?,
            fused_confidence: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            last_report_at: row.get(10)?,
            needs_info_baseline: row.get(11)?,
            version: row.get(12)?,
            trace_digest: row.get(13)?,
        })
    }

    fn into_cluster(self, member_report_ids: Vec<ReportId>) -> TideguardResult<HazardCluster> {
        let id = self.id;
        let status: ClusterStatus = self
            .status
            .parse()
            .map_err(|e| corrupt_row(TABLE, format!("cluster {id}: {e}")))?;
        let cell: GridCell = self
            .cell_key
            .parse()
            .map_err(|e| corrupt_row(TABLE, format!("cluster {id}: {e}")))?;
        Ok(HazardCluster {
            hazard_type: self.hazard_type,
            centroid: GeoPoint::new(self.centroid_lat, self.centroid_lon),
            cell,
            severity: self.severity,
            status,
            fused_confidence: self.fused_confidence,
            member_report_ids,
            created_at: parse_ts(TABLE, &self.created_at)?,
            updated_at: parse_ts(TABLE, &self.updated_at)?,
            last_report_at: parse_ts(TABLE, &self.last_report_at)?,
            needs_info_baseline: self.needs_info_baseline,
            version: self.version as u64,
            trace_digest: self.trace_digest,
            id: ClusterId(id),
        })
    }
}
