//! Review path: reviewer decisions and external severity changes.

use chrono::Utc;
use serde_json::json;

use tideguard_core::errors::{TideguardError, TideguardResult};
use tideguard_core::models::{
    ClusterId, DecisionAction, DecisionOutcome, HazardCluster, HazardEvent, HazardEventKind,
    ValidationDecision,
};
use tideguard_observability::decision_span;
use tideguard_observability::tracing_setup::events;

use crate::engine::HazardEngine;
use crate::locks::acquire;
use crate::request::DecisionRequest;

impl HazardEngine {
    /// Apply a reviewer's decision to a cluster.
    ///
    /// Exactly one of several concurrent decisions on a pending cluster
    /// succeeds; the rest get `ConflictError::TerminalStatus` (or `LostRace`
    /// if another process committed in between). Unknown clusters are
    /// `ClusterNotFound`; empty reviewer ids and oversized notes are
    /// validation errors. Nothing is written on failure.
    pub fn record_decision(
        &self,
        cluster_id: &ClusterId,
        action: DecisionAction,
        notes: Option<&str>,
        reviewer_id: &str,
    ) -> TideguardResult<ValidationDecision> {
        let span = decision_span!(cluster_id, action);
        let _entered = span.enter();

        let lock = self.locks.cluster(cluster_id);
        let _guard = acquire(&lock);

        let cluster = self.require_cluster(cluster_id)?;
        let plan = self
            .lifecycle
            .plan_decision(&cluster, action, notes, reviewer_id, Utc::now())
            .map_err(|e| self.note_conflict(cluster_id, e))?;
        self.storage
            .commit_decision(&plan.cluster, plan.expected_version, &plan.decision)
            .map_err(|e| self.note_conflict(cluster_id, e))?;

        let decision = plan.decision;
        self.observability.metrics.record_decision();
        events::status_changed(
            cluster_id.as_str(),
            decision.from_status.as_str(),
            decision.to_status.as_str(),
            reviewer_id,
        );
        self.publish(HazardEvent::new(
            HazardEventKind::ClusterStatusChanged,
            cluster_id.as_str(),
            plan.cluster.version,
            json!({
                "from": decision.from_status,
                "to": decision.to_status,
                "actor": reviewer_id,
                "decision_id": decision.id,
            }),
        ));
        Ok(decision)
    }

    /// String-typed entry point for review tooling.
    ///
    /// A malformed action (or any other validation failure) is returned as
    /// `Err` before anything is touched; conflicts and unknown clusters map
    /// onto [`DecisionOutcome`].
    pub fn submit_decision(&self, request: &DecisionRequest) -> TideguardResult<DecisionOutcome> {
        let action = request.parsed_action()?;
        let cluster_id = ClusterId::from(request.cluster_id.as_str());
        match self.record_decision(
            &cluster_id,
            action,
            request.notes.as_deref(),
            &request.reviewer_id,
        ) {
            Ok(decision) => Ok(DecisionOutcome::Success { decision }),
            Err(TideguardError::Conflict(conflict)) => Ok(DecisionOutcome::Conflict {
                reason: conflict.to_string(),
            }),
            Err(TideguardError::ClusterNotFound { id }) => {
                Ok(DecisionOutcome::NotFound { cluster_id: id })
            }
            Err(e) => Err(e),
        }
    }

    /// Audit trail of a cluster, oldest first.
    pub fn decision_history(&self, cluster_id: &ClusterId) -> TideguardResult<Vec<ValidationDecision>> {
        self.require_cluster(cluster_id)?;
        self.storage.decisions_for(cluster_id)
    }

    /// Set the externally assessed severity (1..=5).
    pub fn set_severity(&self, cluster_id: &ClusterId, severity: u8) -> TideguardResult<HazardCluster> {
        let lock = self.locks.cluster(cluster_id);
        let _guard = acquire(&lock);

        let cluster = self.require_cluster(cluster_id)?;
        let next = self.lifecycle.plan_severity(&cluster, severity, Utc::now())?;
        self.storage.commit_cluster(&next, cluster.version)?;
        tracing::info!(
            cluster_id = %cluster_id,
            from = cluster.severity,
            to = severity,
            "cluster severity updated"
        );
        Ok(next)
    }

    fn note_conflict(&self, cluster_id: &ClusterId, error: TideguardError) -> TideguardError {
        if error.is_conflict() {
            self.observability.metrics.record_conflict();
            events::decision_conflict(cluster_id.as_str(), &error.to_string());
        }
        error
    }
}
