//! Background reconciliation.
//!
//! One pass retries unattached reports, recomputes dirty clusters (fusion in
//! parallel on rayon, commits one by one under each cluster's lock), prunes
//! idle lock entries, and refreshes the marker snapshot. The tokio loop runs
//! a pass every snapshot interval and emits keepalives in between. Ingest
//! and queries never wait on it.

use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{ClusterId, HazardCluster, HazardEvent, RawReport};
use tideguard_observability::reconcile_span;
use tideguard_observability::tracing_setup::events;

use crate::backoff::BackoffPolicy;
use crate::engine::HazardEngine;
use crate::locks::acquire;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Unattached reports now in a cluster.
    pub attached: usize,
    /// Unattached reports still left after all attempts.
    pub refused: usize,
    /// Dirty clusters whose derived fields were rewritten.
    pub recomputed: usize,
    /// Dirty clusters that could not be recomputed; they stay dirty.
    pub failed: usize,
    /// Queued events finally appended to the event log.
    pub republished: usize,
}

impl HazardEngine {
    /// Run one full pass synchronously.
    pub fn reconcile_once(&self) -> ReconcileReport {
        let pass = self.observability.metrics.snapshot().reconcile_passes + 1;
        let span = reconcile_span!(pass);
        let _entered = span.enter();

        let policy = BackoffPolicy::from_config(&self.config.engine);
        let mut report = ReconcileReport::default();

        match self.retry(&policy, "republish", || self.events.flush_pending()) {
            Ok(0) => {}
            Ok(n) => {
                report.republished = n;
                tracing::info!(republished = n, "queued events appended to the log");
            }
            Err(e) => tracing::warn!(
                error = %e,
                pending = self.events.pending_len(),
                "queued events still not appended"
            ),
        }

        match self.storage.unattached_reports() {
            Ok(unattached) => {
                for raw in &unattached {
                    match self.retry(&policy, "attach", || self.assign(raw)) {
                        Ok(_) => report.attached += 1,
                        Err(e) => {
                            report.refused += 1;
                            tracing::warn!(report_id = %raw.id, error = %e, "report still unattached");
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not list unattached reports"),
        }

        let (recomputed, failed) = self.recompute_dirty(&policy);
        report.recomputed = recomputed;
        report.failed = failed;

        let pruned = self.locks.prune_idle();
        if pruned > 0 {
            tracing::trace!(pruned, "idle lock entries dropped");
        }

        if let Err(e) = self.refresh_markers() {
            tracing::warn!(error = %e, "marker snapshot refresh failed; serving previous snapshot");
        }

        self.observability.metrics.record_reconcile_pass();
        events::reconcile_completed(
            report.attached,
            report.refused,
            report.recomputed,
            report.failed,
        );
        report
    }

    /// Mark every stored cluster dirty so the next pass re-verifies it.
    /// Unchanged clusters are cleared without a commit.
    pub fn mark_all_dirty(&self) -> TideguardResult<usize> {
        let clusters = self.storage.list_clusters(None)?;
        for cluster in &clusters {
            self.dirty.insert(cluster.id.clone());
        }
        Ok(clusters.len())
    }

    /// Recompute dirty clusters. Returns `(recomputed, failed)`.
    fn recompute_dirty(&self, policy: &BackoffPolicy) -> (usize, usize) {
        let ids: Vec<ClusterId> = self.dirty.iter().map(|id| id.key().clone()).collect();
        if ids.is_empty() {
            return (0, 0);
        }

        let mut failed = 0;
        let mut loaded: Vec<(HazardCluster, Vec<RawReport>)> = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.load_with_members(id) {
                Ok(Some(pair)) => loaded.push(pair),
                Ok(None) => {
                    self.dirty.remove(id);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(cluster_id = %id, error = %e, "could not load dirty cluster");
                }
            }
        }

        // Fusion is pure, so the replays run in parallel.
        let fused: Vec<(HazardCluster, TideguardResult<HazardCluster>)> = loaded
            .into_par_iter()
            .map(|(cluster, members)| {
                let mut next = cluster.clone();
                let result = self.fusion.apply(&mut next, &members).map(|_| next);
                (cluster, result)
            })
            .collect();

        let mut recomputed = 0;
        for (loaded_cluster, result) in fused {
            let id = loaded_cluster.id.clone();
            let outcome = result.and_then(|candidate| {
                self.retry(policy, "recompute", || {
                    self.commit_recomputed(&loaded_cluster, &candidate)
                })
            });
            match outcome {
                Ok(changed) => {
                    self.dirty.remove(&id);
                    if changed {
                        recomputed += 1;
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(cluster_id = %id, error = %e, "recompute failed; cluster stays dirty");
                }
            }
        }
        (recomputed, failed)
    }

    fn load_with_members(
        &self,
        id: &ClusterId,
    ) -> TideguardResult<Option<(HazardCluster, Vec<RawReport>)>> {
        let Some(cluster) = self.storage.get_cluster(id)? else {
            return Ok(None);
        };
        let members = self.storage.cluster_members(id)?;
        Ok(Some((cluster, members)))
    }

    /// Commit a recomputed cluster under its lock. Returns whether anything
    /// was written.
    ///
    /// If the stored version moved since the replay, the newer commit already
    /// carries a fresh fusion and nothing is written.
    fn commit_recomputed(
        &self,
        loaded: &HazardCluster,
        candidate: &HazardCluster,
    ) -> TideguardResult<bool> {
        let lock = self.locks.cluster(&loaded.id);
        let _guard = acquire(&lock);

        let current = self.require_cluster(&loaded.id)?;
        if current.version != loaded.version {
            return Ok(false);
        }
        let unchanged = candidate.trace_digest == current.trace_digest
            && candidate.fused_confidence == current.fused_confidence
            && candidate.hazard_type == current.hazard_type
            && candidate.centroid == current.centroid
            && candidate.last_report_at == current.last_report_at;
        if unchanged {
            return Ok(false);
        }

        let mut next = candidate.clone();
        let reopened = self.lifecycle.on_confidence_update(&mut next)?;
        next.version = current.version + 1;
        next.updated_at = Utc::now();
        self.storage.commit_cluster(&next, current.version)?;
        self.announce_fusion(&next, current.fused_confidence, current.status, reopened);
        Ok(true)
    }

    fn retry<T, F>(&self, policy: &BackoffPolicy, label: &str, op: F) -> TideguardResult<T>
    where
        F: FnMut() -> TideguardResult<T>,
    {
        policy.retry(label, op, |_| self.observability.metrics.record_retry())
    }

    /// Broadcast a keepalive to live subscribers.
    pub fn keepalive(&self) {
        self.events.broadcast_only(HazardEvent::keepalive());
    }
}

/// Handle to the background task. Dropping it leaves the task running;
/// call [`BackgroundHandle::shutdown`] to stop it.
pub struct BackgroundHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BackgroundHandle {
    /// Signal the loop to stop and wait for the current pass to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "reconciler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the reconciliation loop on the current tokio runtime.
///
/// The first pass runs immediately and re-verifies every cluster, so derived
/// fields left stale by a crash are repaired after restart.
pub fn spawn_background(engine: Arc<HazardEngine>) -> BackgroundHandle {
    let (shutdown, mut stop) = watch::channel(false);
    let refresh_every = engine.config().engine.snapshot_refresh();
    let keepalive_every = engine.config().engine.keepalive_interval();

    let task = tokio::spawn(async move {
        let mut refresh = tokio::time::interval(refresh_every);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut keepalive = tokio::time::interval(keepalive_every);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first keepalive tick is immediate; skip it.
        keepalive.tick().await;

        let mut first_pass = true;
        tracing::info!(?refresh_every, ?keepalive_every, "reconciler started");
        loop {
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = refresh.tick() => {
                    let worker = Arc::clone(&engine);
                    let verify_all = std::mem::take(&mut first_pass);
                    let pass = tokio::task::spawn_blocking(move || {
                        if verify_all {
                            if let Err(e) = worker.mark_all_dirty() {
                                tracing::warn!(error = %e, "could not schedule startup verification");
                            }
                        }
                        worker.reconcile_once()
                    });
                    if let Err(e) = pass.await {
                        tracing::error!(error = %e, "reconciliation pass panicked");
                    }
                }
                _ = keepalive.tick() => engine.keepalive(),
            }
        }
        tracing::info!("reconciler stopped");
    });

    BackgroundHandle { shutdown, task }
}
