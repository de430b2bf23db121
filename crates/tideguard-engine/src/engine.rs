//! `HazardEngine`: owns every subsystem and runs the ingest path.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde_json::json;
use tokio::sync::broadcast;

use tideguard_core::config::TideguardConfig;
use tideguard_core::errors::{TideguardError, TideguardResult};
use tideguard_core::models::{
    ClusterId, ClusterStatus, GridCell, HazardCluster, HazardEvent, HazardEventKind, RawReport,
    ReportId, ReportSubmission,
};
use tideguard_core::traits::{IClassifier, ICredibilityScorer, IHazardStorage};
use tideguard_dedup::{Assignment, Deduplicator};
use tideguard_fusion::FusionEngine;
use tideguard_ingest::ReportIngress;
use tideguard_lifecycle::LifecycleManager;
use tideguard_observability::tracing_setup::events;
use tideguard_observability::degradation::DegradationAlert;
use tideguard_observability::{assignment_span, fusion_span, ingest_span, ObservabilityEngine};
use tideguard_storage::StorageEngine;

use crate::events::EventBus;
use crate::locks::{acquire, LockTable};
use crate::snapshot::MarkerSnapshot;

/// Actor recorded for transitions the engine makes on its own.
pub(crate) const SYSTEM_ACTOR: &str = "system";

pub struct HazardEngine {
    pub(crate) config: TideguardConfig,
    pub(crate) storage: Arc<dyn IHazardStorage>,
    pub(crate) ingress: ReportIngress,
    pub(crate) dedup: Deduplicator,
    pub(crate) fusion: FusionEngine,
    pub(crate) lifecycle: LifecycleManager,
    pub(crate) locks: LockTable,
    pub(crate) events: EventBus,
    pub(crate) snapshot: RwLock<Option<Arc<MarkerSnapshot>>>,
    /// Clusters whose stored derived fields may not match their members.
    pub(crate) dirty: DashSet<ClusterId>,
    pub(crate) observability: ObservabilityEngine,
}

impl HazardEngine {
    /// Build an engine over any storage backend.
    pub fn new(config: TideguardConfig, storage: Arc<dyn IHazardStorage>) -> TideguardResult<Self> {
        config.validate()?;
        let events = EventBus::new(Arc::clone(&storage), config.engine.event_channel_capacity);
        Ok(Self {
            ingress: ReportIngress::new(config.ingest.clone()),
            dedup: Deduplicator::new(config.dedup.clone()),
            fusion: FusionEngine::new(config.fusion.clone()),
            lifecycle: LifecycleManager::new(config.lifecycle.clone()),
            locks: LockTable::new(),
            events,
            snapshot: RwLock::new(None),
            dirty: DashSet::new(),
            observability: ObservabilityEngine::from_config(&config.observability),
            storage,
            config,
        })
    }

    /// Open the SQLite database named in `config.storage`.
    pub fn open(config: TideguardConfig) -> TideguardResult<Self> {
        let storage = StorageEngine::open(&config.storage)?;
        Self::new(config, Arc::new(storage))
    }

    /// Engine over a fresh in-memory database.
    pub fn in_memory(config: TideguardConfig) -> TideguardResult<Self> {
        let storage = StorageEngine::open_in_memory()?;
        Self::new(config, Arc::new(storage))
    }

    /// Use an external classifier for submissions that carry no scores.
    pub fn with_classifier(mut self, classifier: Arc<dyn IClassifier>) -> Self {
        self.ingress = self.ingress.with_classifier(classifier);
        self
    }

    /// Replace the built-in credibility scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn ICredibilityScorer>) -> Self {
        self.ingress = self.ingress.with_scorer(scorer);
        self
    }

    pub fn config(&self) -> &TideguardConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn IHazardStorage> {
        &self.storage
    }

    pub fn observability(&self) -> &ObservabilityEngine {
        &self.observability
    }

    /// Scoring components that are failing often or have not recovered.
    pub fn degradation_alerts(&self) -> Vec<DegradationAlert> {
        self.observability.degradation_alerts()
    }

    /// Metrics, pending event count, and degradation alerts as JSON.
    pub fn health_report(&self) -> TideguardResult<serde_json::Value> {
        let mut report = self.observability.report()?;
        report["pending_events"] = json!(self.events.pending_len());
        report["dirty_clusters"] = json!(self.dirty.len());
        Ok(report)
    }

    /// Live event stream. Pair with [`HazardEngine::events_since`] for catch-up.
    pub fn subscribe(&self) -> broadcast::Receiver<HazardEvent> {
        self.events.subscribe()
    }

    /// Events committed to state but not yet in the event log.
    pub fn pending_events(&self) -> usize {
        self.events.pending_len()
    }

    pub fn events_since(&self, after_sequence: u64, limit: usize) -> TideguardResult<Vec<HazardEvent>> {
        self.storage.events_since(after_sequence, limit)
    }

    /// Flag a cluster for recomputation by the next reconciliation pass.
    pub fn mark_dirty(&self, id: &ClusterId) {
        self.dirty.insert(id.clone());
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    // --- Ingest ---

    /// Accept a report, store it, and resolve it into a cluster.
    ///
    /// Validation failures reject the report with nothing stored. Once the
    /// report is stored it is accepted: if assignment then fails, the report
    /// stays unattached and the reconciler retries it.
    pub fn submit_report(&self, submission: &ReportSubmission) -> TideguardResult<ReportId> {
        let now = Utc::now();
        let span = ingest_span!(submission.source_type);
        let _entered = span.enter();

        let ingested = self.ingress.accept(submission, now)?;
        for d in &ingested.degradations {
            self.observability
                .record_degradation(&d.component, &d.failure, &d.fallback_used);
        }
        if !ingested.degradations.is_empty() {
            for alert in self.observability.degradation_alerts() {
                tracing::warn!(
                    component = %alert.component,
                    level = ?alert.level,
                    fallbacks = alert.fallbacks_in_window,
                    "{}",
                    alert.message
                );
            }
        }
        let degraded = |component: &str| ingested.degradations.iter().any(|d| d.component == component);
        let classifier_used =
            submission.hazard_type_guess.is_none() || submission.base_confidence.is_none();
        if classifier_used && !degraded("classifier") {
            self.observability.mark_recovered("classifier");
        }
        if submission.credibility_score.is_none() && !degraded("credibility_scorer") {
            self.observability.mark_recovered("credibility_scorer");
        }
        let report = ingested.report;

        self.storage.insert_report(&report)?;
        self.observability.metrics.record_ingested();
        if report.unclassified {
            self.observability.metrics.record_unclassified();
        }

        let cell = self.dedup.cell_of(report.position);
        events::report_accepted(
            report.id.as_str(),
            report.source_type.as_str(),
            &cell.key(),
            report.unclassified,
        );
        self.publish(HazardEvent::new(
            HazardEventKind::NewReport,
            report.id.as_str(),
            1,
            json!({
                "source_type": report.source_type,
                "cell": cell.key(),
                "hazard_type": report.hazard_type_guess,
                "unclassified": report.unclassified,
            }),
        ));

        if let Err(e) = self.assign(&report) {
            tracing::warn!(
                report_id = %report.id,
                error = %e,
                transient = e.is_transient(),
                "assignment failed; report left for reconciliation"
            );
        }
        Ok(report.id)
    }

    // --- Assignment ---

    /// Attach `report` to the best eligible cluster in its cell, or seed a new
    /// one. Idempotent: an already attached report returns its cluster.
    pub(crate) fn assign(&self, report: &RawReport) -> TideguardResult<ClusterId> {
        let cell = self.dedup.cell_of(report.position);
        let span = assignment_span!(report.id, cell);
        let _entered = span.enter();

        let cell_lock = self.locks.cell(&cell);
        let _cell_guard = acquire(&cell_lock);

        if let Some(existing) = self.storage.cluster_of_report(&report.id)? {
            return Ok(existing);
        }

        let candidates = self.storage.clusters_in_cell(&cell)?;
        match self.dedup.choose_cluster(report, &candidates) {
            Assignment::Join(cluster_id) => {
                let cluster_lock = self.locks.cluster(&cluster_id);
                let _cluster_guard = acquire(&cluster_lock);
                // Re-read under the cluster lock; a decision may have committed.
                let cluster = self.require_cluster(&cluster_id)?;
                self.attach(cluster, report)
            }
            Assignment::Seed(cell) => self.seed(report, cell),
        }
    }

    fn attach(&self, cluster: HazardCluster, report: &RawReport) -> TideguardResult<ClusterId> {
        let now = Utc::now();
        let expected_version = cluster.version;
        let previous = cluster.fused_confidence;
        let previous_status = cluster.status;

        let mut members = self.storage.cluster_members(&cluster.id)?;
        members.push(report.clone());
        let mut next = cluster;
        next.member_report_ids.push(report.id.clone());

        let reopened = self.recompute_and_stage(&mut next, &members, expected_version, now)?;
        self.storage.commit_cluster(&next, expected_version)?;
        self.dirty.remove(&next.id);

        self.observability.metrics.record_attached();
        events::report_attached(report.id.as_str(), next.id.as_str(), next.member_count());
        self.publish(HazardEvent::new(
            HazardEventKind::ReportAttached,
            next.id.as_str(),
            next.version,
            json!({ "report_id": report.id, "member_count": next.member_count() }),
        ));
        self.announce_fusion(&next, previous, previous_status, reopened);
        Ok(next.id)
    }

    fn seed(&self, report: &RawReport, cell: GridCell) -> TideguardResult<ClusterId> {
        let now = Utc::now();
        let mut cluster = HazardCluster {
            id: ClusterId::generate(),
            hazard_type: report.hazard_type_guess.clone(),
            centroid: report.position,
            cell,
            severity: self.lifecycle.config().default_severity,
            status: ClusterStatus::Pending,
            fused_confidence: 0.0,
            member_report_ids: vec![report.id.clone()],
            created_at: now,
            updated_at: now,
            last_report_at: report.submitted_at,
            needs_info_baseline: None,
            version: 1,
            trace_digest: String::new(),
        };
        {
            let span = fusion_span!(cluster.id, 1usize);
            let _entered = span.enter();
            self.fusion.apply(&mut cluster, std::slice::from_ref(report))?;
        }
        self.observability.metrics.record_fusion();
        self.storage.create_cluster(&cluster)?;

        self.observability.metrics.record_cluster_created();
        events::cluster_created(cluster.id.as_str(), report.id.as_str(), &cell.key());
        self.publish(HazardEvent::new(
            HazardEventKind::ClusterCreated,
            cluster.id.as_str(),
            cluster.version,
            json!({
                "report_id": report.id,
                "cell": cell.key(),
                "hazard_type": cluster.hazard_type,
                "fused_confidence": cluster.fused_confidence,
            }),
        ));
        Ok(cluster.id)
    }

    /// Recompute fusion into `next`, apply the re-open rule, and stage the
    /// version bump. Returns whether the cluster re-opened.
    pub(crate) fn recompute_and_stage(
        &self,
        next: &mut HazardCluster,
        members: &[RawReport],
        expected_version: u64,
        now: DateTime<Utc>,
    ) -> TideguardResult<bool> {
        {
            let span = fusion_span!(next.id, members.len());
            let _entered = span.enter();
            self.fusion.apply(next, members)?;
        }
        self.observability.metrics.record_fusion();
        let reopened = self.lifecycle.on_confidence_update(next)?;
        next.version = expected_version + 1;
        next.updated_at = now;
        Ok(reopened)
    }

    /// Log and publish the confidence change and, if any, the system re-open.
    pub(crate) fn announce_fusion(
        &self,
        cluster: &HazardCluster,
        previous: f64,
        previous_status: ClusterStatus,
        reopened: bool,
    ) {
        events::confidence_updated(
            cluster.id.as_str(),
            previous,
            cluster.fused_confidence,
            &cluster.trace_digest,
        );
        self.publish(HazardEvent::new(
            HazardEventKind::ClusterConfidenceUpdated,
            cluster.id.as_str(),
            cluster.version,
            json!({
                "previous": previous,
                "fused_confidence": cluster.fused_confidence,
                "trace_digest": cluster.trace_digest,
            }),
        ));
        if reopened {
            self.observability.metrics.record_reopened();
            events::status_changed(
                cluster.id.as_str(),
                previous_status.as_str(),
                cluster.status.as_str(),
                SYSTEM_ACTOR,
            );
            self.publish(HazardEvent::new(
                HazardEventKind::ClusterStatusChanged,
                cluster.id.as_str(),
                cluster.version,
                json!({
                    "from": previous_status,
                    "to": cluster.status,
                    "actor": SYSTEM_ACTOR,
                }),
            ));
        }
    }

    // --- Helpers ---

    pub(crate) fn require_cluster(&self, id: &ClusterId) -> TideguardResult<HazardCluster> {
        self.storage
            .get_cluster(id)?
            .ok_or_else(|| TideguardError::ClusterNotFound { id: id.to_string() })
    }

    /// Publish to the outbox and live subscribers. A failed append is logged,
    /// never surfaced: the state change it describes is already committed,
    /// and the event stays queued until the next publish or reconcile pass.
    pub(crate) fn publish(&self, event: HazardEvent) {
        let kind = event.kind;
        let subject = event.subject_id.clone();
        if let Err(e) = self.events.publish(event) {
            tracing::error!(
                kind = %kind,
                subject_id = %subject,
                error = %e,
                pending = self.events.pending_len(),
                "event append failed; queued for redelivery"
            );
        }
    }
}
