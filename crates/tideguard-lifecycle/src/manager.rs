use chrono::{DateTime, Utc};
use tideguard_core::config::LifecycleConfig;
use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{
    ClusterStatus, DecisionAction, HazardCluster, ValidationDecision,
};

use crate::{transitions, urgency, validation};

/// A validated decision, ready to be committed with a compare-and-set on
/// `expected_version`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPlan {
    pub expected_version: u64,
    /// Cluster as it will be stored: new status, bumped version and `updated_at`.
    pub cluster: HazardCluster,
    pub decision: ValidationDecision,
}

/// Applies review rules to clusters. Holds no state beyond its configuration.
#[derive(Debug, Clone, Default)]
pub struct LifecycleManager {
    config: LifecycleConfig,
}

impl LifecycleManager {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Check inputs, run the state machine, and build the next state plus audit record.
    ///
    /// Nothing is mutated; a terminal cluster yields `ConflictError::TerminalStatus`.
    pub fn plan_decision(
        &self,
        cluster: &HazardCluster,
        action: DecisionAction,
        notes: Option<&str>,
        reviewer_id: &str,
        now: DateTime<Utc>,
    ) -> TideguardResult<DecisionPlan> {
        validation::validate_reviewer(reviewer_id)?;
        validation::validate_notes(notes, &self.config)?;
        let to_status = transitions::apply_decision(&cluster.id, cluster.status, action)?;

        let mut next = cluster.clone();
        next.status = to_status;
        next.needs_info_baseline = match to_status {
            ClusterStatus::NeedsMoreInfo => Some(cluster.fused_confidence),
            _ => None,
        };
        next.version = cluster.version + 1;
        next.updated_at = now;

        let decision = ValidationDecision {
            id: uuid::Uuid::new_v4().to_string(),
            cluster_id: cluster.id.clone(),
            action,
            notes: notes.map(str::to_string),
            reviewer_id: reviewer_id.to_string(),
            decided_at: now,
            from_status: cluster.status,
            to_status,
            fused_confidence_at_decision: cluster.fused_confidence,
        };

        Ok(DecisionPlan {
            expected_version: cluster.version,
            cluster: next,
            decision,
        })
    }

    /// Whether new corroboration lifts a NeedsMoreInfo cluster back into review.
    pub fn should_reopen(&self, cluster: &HazardCluster) -> bool {
        if cluster.status != ClusterStatus::NeedsMoreInfo {
            return false;
        }
        let baseline = cluster.needs_info_baseline.unwrap_or(0.0);
        // Small epsilon so 0.1 above a baseline counts despite float rounding.
        cluster.fused_confidence - baseline >= self.config.reopen_delta - 1e-9
    }

    /// Re-open in place after a confidence update. Returns whether the status changed.
    pub fn on_confidence_update(&self, cluster: &mut HazardCluster) -> TideguardResult<bool> {
        if !self.should_reopen(cluster) {
            return Ok(false);
        }
        cluster.status = transitions::reopen(&cluster.id, cluster.status)?;
        tracing::info!(
            cluster_id = %cluster.id,
            fused_confidence = cluster.fused_confidence,
            baseline = cluster.needs_info_baseline.unwrap_or(0.0),
            "cluster re-opened for review"
        );
        cluster.needs_info_baseline = None;
        Ok(true)
    }

    /// Next state after an external severity change.
    pub fn plan_severity(
        &self,
        cluster: &HazardCluster,
        severity: u8,
        now: DateTime<Utc>,
    ) -> TideguardResult<HazardCluster> {
        validation::validate_severity(severity)?;
        let mut next = cluster.clone();
        next.severity = severity;
        next.version = cluster.version + 1;
        next.updated_at = now;
        Ok(next)
    }

    pub fn is_urgent(&self, cluster: &HazardCluster) -> bool {
        urgency::is_urgent(cluster, &self.config)
    }

    /// Queued clusters flagged urgent, most urgent first.
    pub fn urgent_review_queue(&self, clusters: Vec<HazardCluster>) -> Vec<HazardCluster> {
        let mut urgent: Vec<HazardCluster> =
            clusters.into_iter().filter(|c| self.is_urgent(c)).collect();
        urgent.sort_by(urgency::urgency_order);
        urgent
    }
}
