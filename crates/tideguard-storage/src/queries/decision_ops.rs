//! Validation decisions: atomic status commit plus audit row.

use rusqlite::{params, Connection, Row};

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{
    ClusterId, ClusterStatus, DecisionAction, HazardCluster, ValidationDecision,
};

use super::cluster_ops::update_cluster_row;
use super::{fmt_ts, in_transaction, parse_ts};
use crate::{corrupt_row, to_storage_err};

const TABLE: &str = "validation_decisions";

/// Commit the transitioned cluster and its decision record together.
///
/// The update is guarded on both the expected version and the decision's
/// `from_status`, so of two racing reviewers exactly one commits.
pub fn commit_decision(
    conn: &Connection,
    cluster: &HazardCluster,
    expected_version: u64,
    decision: &ValidationDecision,
) -> TideguardResult<()> {
    in_transaction(conn, "commit_decision", |tx| {
        update_cluster_row(tx, cluster, expected_version, Some(decision.from_status))?;
        insert_decision(tx, decision)
    })
}

fn insert_decision(conn: &Connection, decision: &ValidationDecision) -> TideguardResult<()> {
    conn.execute(
        "INSERT INTO validation_decisions (
            id, cluster_id, action, notes, reviewer_id, decided_at,
            from_status, to_status, fused_confidence_at_decision
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            decision.id,
            decision.cluster_id.as_str(),
            decision.action.as_str(),
            decision.notes,
            decision.reviewer_id,
            fmt_ts(&decision.decided_at),
            decision.from_status.as_str(),
            decision.to_status.as_str(),
            decision.fused_confidence_at_decision,
        ],
    )
    .map_err(|e| to_storage_err(format!("insert decision {}: {e}", decision.id)))?;
    Ok(())
}

/// Decisions for a cluster, oldest first.
pub fn decisions_for(conn: &Connection, id: &ClusterId) -> TideguardResult<Vec<ValidationDecision>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, cluster_id, action, notes, reviewer_id, decided_at,
                    from_status, to_status, fused_confidence_at_decision
             FROM validation_decisions
             WHERE cluster_id = ?1
             ORDER BY decided_at, rowid",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], DecisionRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(DecisionRow::into_decision).collect()
}

struct DecisionRow {
    id: String,
    cluster_id: String,
    action: String,
    notes: Option<String>,
    reviewer_id: String,
    decided_at: String,
    from_status: String,
    to_status: String,
    fused_confidence_at_decision: f64,
}

impl DecisionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            cluster_id: row.get(1)?,
            action: row.get(2)?,
            notes: row.get(3)?,
            reviewer_id: row.get(4)?,
            decided_at: row.get(5)?,
            from_status: row.get(6)?,
            to_status: row.get(7)?,
            fused_confidence_at_decision: row.get(8)?,
        })
    }

    fn into_decision(self) -> TideguardResult<ValidationDecision> {
        let bad = |e: tideguard_core::TideguardError| corrupt_row(TABLE, e.to_string());
        let action: DecisionAction = self.action.parse().map_err(bad)?;
        let from_status: ClusterStatus = self.from_status.parse().map_err(bad)?;
        let to_status: ClusterStatus = self.to_status.parse().map_err(bad)?;
        Ok(ValidationDecision {
            id: self.id,
            cluster_id: ClusterId(self.cluster_id),
            action,
            notes: self.notes,
            reviewer_id: self.reviewer_id,
            decided_at: parse_ts(TABLE, &self.decided_at)?,
            from_status,
            to_status,
            fused_confidence_at_decision: self.fused_confidence_at_decision,
        })
    }
}
