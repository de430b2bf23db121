//! Cluster status transitions as a strict state machine.
//!
//! Valid transitions:
//! - Pending → Approved | Rejected | NeedsMoreInfo (reviewer decision)
//! - NeedsMoreInfo → Approved | Rejected | NeedsMoreInfo (reviewer decision)
//! - NeedsMoreInfo → Pending (re-open on new corroboration)
//!
//! Approved and Rejected are terminal: every transition out of them returns
//! `ConflictError::TerminalStatus`.

use tideguard_core::errors::{ConflictError, TideguardError, TideguardResult};
use tideguard_core::models::{ClusterId, ClusterStatus, DecisionAction};

fn terminal(cluster_id: &ClusterId, status: ClusterStatus) -> TideguardError {
    ConflictError::TerminalStatus {
        cluster_id: cluster_id.to_string(),
        status: status.to_string(),
    }
    .into()
}

/// Status after a reviewer applies `action` to a cluster in `current`.
pub fn apply_decision(
    cluster_id: &ClusterId,
    current: ClusterStatus,
    action: DecisionAction,
) -> TideguardResult<ClusterStatus> {
    match current {
        ClusterStatus::Pending | ClusterStatus::NeedsMoreInfo => Ok(action.target_status()),
        ClusterStatus::Approved | ClusterStatus::Rejected => Err(terminal(cluster_id, current)),
    }
}

/// Move a cluster awaiting more information back into the pending queue.
///
/// Only valid from NeedsMoreInfo.
pub fn reopen(cluster_id: &ClusterId, current: ClusterStatus) -> TideguardResult<ClusterStatus> {
    match current {
        ClusterStatus::NeedsMoreInfo => Ok(ClusterStatus::Pending),
        ClusterStatus::Approved | ClusterStatus::Rejected => Err(terminal(cluster_id, current)),
        ClusterStatus::Pending => Err(TideguardError::validation(format!(
            "cluster {cluster_id} is already pending"
        ))),
    }
}
