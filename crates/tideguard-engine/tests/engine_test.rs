use chrono::{Duration, Timelike, Utc};
use tideguard_core::config::TideguardConfig;
use tideguard_core::errors::{ConflictError, TideguardError};
use tideguard_core::models::{
    ClusterId, ClusterStatus, DecisionAction, DecisionOutcome, GeoPoint, HazardEventKind,
    MarkerKind, MarkerRef, ReportSubmission, SourceType,
};
use tideguard_engine::{DecisionRequest, EventApplier, HazardEngine};

const HARBOUR: (f64, f64) = (13.0827, 80.2707);
// Same ~111 m cell as HARBOUR.
const HARBOUR_PIER: (f64, f64) = (13.0829, 80.2709);
const LIGHTHOUSE: (f64, f64) = (13.0401, 80.2791);

fn engine() -> HazardEngine {
    HazardEngine::in_memory(TideguardConfig::default()).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn report_at(
    at: (f64, f64),
    source: SourceType,
    base: f64,
    cred: f64,
    mins_ago: i64,
) -> ReportSubmission {
    ReportSubmission::scored(
        GeoPoint::new(at.0, at.1),
        source,
        "flood",
        base,
        cred,
        Utc::now() - Duration::minutes(mins_ago),
    )
}

fn citizen(at: (f64, f64), mins_ago: i64) -> ReportSubmission {
    report_at(at, SourceType::Citizen, 0.15, 0.5, mins_ago)
}

fn official(at: (f64, f64), mins_ago: i64) -> ReportSubmission {
    report_at(at, SourceType::Official, 0.5, 0.95, mins_ago)
}

fn only_cluster(engine: &HazardEngine) -> ClusterId {
    let clusters = engine.list_clusters(None).unwrap();
    assert_eq!(clusters.len(), 1, "expected exactly one cluster");
    clusters[0].id.clone()
}

// --- Ingest and assignment ---

#[test]
fn first_report_seeds_a_pending_cluster() {
    let engine = engine();
    let report_id = engine.submit_report(&citizen(HARBOUR, 20)).unwrap();

    let cluster = engine.get_cluster(&only_cluster(&engine)).unwrap();
    assert_eq!(cluster.status, ClusterStatus::Pending);
    assert_eq!(cluster.version, 1);
    assert_eq!(cluster.severity, 3);
    assert_eq!(cluster.member_report_ids, vec![report_id]);
    assert!(close(cluster.fused_confidence, 0.35));
    assert!(!cluster.trace_digest.is_empty());
}

#[test]
fn corroboration_in_the_same_cell_joins_and_fuses() {
    let engine = engine();
    let first = engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    let second = engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();

    let cluster = engine.get_cluster(&only_cluster(&engine)).unwrap();
    assert_eq!(cluster.member_report_ids, vec![first, second]);
    assert_eq!(cluster.version, 2);
    assert!(close(cluster.fused_confidence, 0.534));
}

#[test]
fn distant_report_seeds_its_own_cluster() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&citizen(LIGHTHOUSE, 15)).unwrap();
    assert_eq!(engine.list_clusters(None).unwrap().len(), 2);
}

#[test]
fn report_outside_the_join_window_seeds_a_new_cluster() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 60 * 10)).unwrap();
    engine.submit_report(&citizen(HARBOUR, 5)).unwrap();
    assert_eq!(engine.list_clusters(None).unwrap().len(), 2);
}

#[test]
fn invalid_submission_stores_nothing() {
    let engine = engine();
    let bad = report_at((95.0, 80.0), SourceType::Citizen, 0.4, 0.5, 1);
    let err = engine.submit_report(&bad).unwrap_err();
    assert!(err.is_validation());

    let out_of_range = report_at(HARBOUR, SourceType::Citizen, 1.4, 0.5, 1);
    assert!(engine.submit_report(&out_of_range).unwrap_err().is_validation());

    assert!(engine.list_clusters(None).unwrap().is_empty());
    assert!(engine.events_since(0, 100).unwrap().is_empty());
    assert_eq!(engine.observability().metrics.snapshot().reports_ingested, 0);
}

#[test]
fn rejected_clusters_absorb_nothing_and_are_hidden() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 30)).unwrap();
    let rejected = only_cluster(&engine);
    engine
        .record_decision(&rejected, DecisionAction::Reject, Some("prank"), "rev-1")
        .unwrap();

    engine.submit_report(&citizen(HARBOUR_PIER, 5)).unwrap();
    let clusters = engine.list_clusters(None).unwrap();
    assert_eq!(clusters.len(), 2);
    let fresh = clusters.iter().find(|c| c.id != rejected).unwrap();
    assert_eq!(fresh.member_count(), 1);

    let view = engine.list_markers(10).unwrap();
    assert_eq!(view.markers.len(), 1);
    assert_eq!(view.markers[0].target, MarkerRef::Cluster(fresh.id.clone()));
}

// --- Markers ---

#[test]
fn one_marker_per_cell() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();
    engine.submit_report(&citizen(LIGHTHOUSE, 5)).unwrap();

    let view = engine.list_markers(10).unwrap();
    assert_eq!(view.markers.len(), 2);
    assert!(view.markers.iter().all(|m| m.kind == MarkerKind::Cluster));
    assert_eq!(view.staleness_bound_ms, 2_000);

    let mut cells: Vec<String> = view.markers.iter().map(|m| m.cell.key()).collect();
    cells.dedup();
    assert_eq!(cells.len(), 2);
}

#[test]
fn viewer_report_overrides_its_cluster_marker() {
    let engine = engine();
    engine.submit_report(&official(HARBOUR, 20)).unwrap();
    let mine = engine
        .submit_report(&citizen(HARBOUR_PIER, 2).by_viewer())
        .unwrap();

    let snapshot = engine.refresh_markers().unwrap();
    assert_eq!(snapshot.markers.len(), 1);
    let marker = &snapshot.markers[0];
    assert_eq!(marker.kind, MarkerKind::StandaloneReport);
    assert_eq!(marker.priority, 9);
    assert_eq!(marker.target, MarkerRef::Report(mine));
    assert!(close(marker.confidence_for_display, 0.15));
}

#[test]
fn uncorroborated_clusters_rank_below_corroborated_ones() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();
    engine.submit_report(&citizen(LIGHTHOUSE, 5)).unwrap();
    engine
        .submit_report(&citizen((13.0601, 80.2501), 3).by_viewer())
        .unwrap();

    let view = engine.refresh_markers().unwrap();
    let ranked: Vec<(i32, MarkerKind)> = view.markers.iter().map(|m| (m.priority, m.kind)).collect();
    assert_eq!(
        ranked,
        vec![
            (10, MarkerKind::Cluster),
            (8, MarkerKind::Cluster),
            (5, MarkerKind::Cluster),
        ]
    );
}

#[test]
fn marker_limit_truncates_the_snapshot_view() {
    let engine = engine();
    for i in 0..5 {
        let at = (13.0 + i as f64 * 0.01, 80.0);
        engine.submit_report(&citizen(at, 10)).unwrap();
    }
    engine.refresh_markers().unwrap();
    assert_eq!(engine.list_markers(3).unwrap().markers.len(), 3);
    assert_eq!(engine.list_markers(50).unwrap().markers.len(), 5);
}

// --- Review ---

#[test]
fn approval_commits_status_and_audit_record() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    let id = only_cluster(&engine);

    let decision = engine
        .record_decision(&id, DecisionAction::Approve, Some("confirmed by patrol"), "rev-7")
        .unwrap();
    assert_eq!(decision.from_status, ClusterStatus::Pending);
    assert_eq!(decision.to_status, ClusterStatus::Approved);
    assert!(close(decision.fused_confidence_at_decision, 0.35));

    let cluster = engine.get_cluster(&id).unwrap();
    assert_eq!(cluster.status, ClusterStatus::Approved);
    assert_eq!(cluster.version, 2);
    let history = engine.decision_history(&id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, decision.id);
    assert_eq!(history[0].reviewer_id, "rev-7");
    assert!(engine.review_queue().unwrap().is_empty());
}

#[test]
fn second_decision_on_a_terminal_cluster_conflicts() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    let id = only_cluster(&engine);
    engine
        .record_decision(&id, DecisionAction::Approve, None, "rev-1")
        .unwrap();

    let err = engine
        .record_decision(&id, DecisionAction::Reject, None, "rev-2")
        .unwrap_err();
    assert!(matches!(
        err,
        TideguardError::Conflict(ConflictError::TerminalStatus { .. })
    ));
    assert_eq!(engine.decision_history(&id).unwrap().len(), 1);
    assert_eq!(engine.get_cluster(&id).unwrap().version, 2);
    assert_eq!(engine.observability().metrics.snapshot().decision_conflicts, 1);
}

#[test]
fn decision_inputs_are_validated() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    let id = only_cluster(&engine);

    let blank = engine
        .record_decision(&id, DecisionAction::Approve, None, "  ")
        .unwrap_err();
    assert!(blank.is_validation());

    let long_notes = "x".repeat(4_001);
    let too_long = engine
        .record_decision(&id, DecisionAction::Approve, Some(&long_notes), "rev-1")
        .unwrap_err();
    assert!(too_long.is_validation());

    let missing = engine
        .record_decision(&ClusterId::from("nope"), DecisionAction::Approve, None, "rev-1")
        .unwrap_err();
    assert!(missing.is_not_found());
    assert!(engine.decision_history(&id).unwrap().is_empty());
}

#[test]
fn submit_decision_maps_outcomes() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    let id = only_cluster(&engine);

    let malformed = engine
        .submit_decision(&DecisionRequest::new(&id, "escalate", "rev-1"))
        .unwrap_err();
    assert!(malformed.is_validation());

    let ok = engine
        .submit_decision(&DecisionRequest::new(&id, "approve", "rev-1").with_notes("seen it"))
        .unwrap();
    assert!(matches!(ok, DecisionOutcome::Success { .. }));

    let conflict = engine
        .submit_decision(&DecisionRequest::new(&id, "reject", "rev-2"))
        .unwrap();
    assert!(matches!(conflict, DecisionOutcome::Conflict { .. }));

    let missing = engine
        .submit_decision(&DecisionRequest::new(&ClusterId::from("ghost"), "approve", "rev-1"))
        .unwrap();
    assert_eq!(
        missing,
        DecisionOutcome::NotFound {
            cluster_id: "ghost".into()
        }
    );
}

#[test]
fn needs_more_info_reopens_on_new_corroboration() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 30)).unwrap();
    let id = only_cluster(&engine);
    engine
        .record_decision(&id, DecisionAction::RequestMoreInfo, Some("photo?"), "rev-1")
        .unwrap();
    let waiting = engine.get_cluster(&id).unwrap();
    assert_eq!(waiting.status, ClusterStatus::NeedsMoreInfo);
    assert_eq!(waiting.needs_info_baseline, Some(waiting.fused_confidence));

    engine.submit_report(&official(HARBOUR_PIER, 5)).unwrap();
    let reopened = engine.get_cluster(&id).unwrap();
    assert_eq!(reopened.status, ClusterStatus::Pending);
    assert_eq!(reopened.needs_info_baseline, None);
    assert!(close(reopened.fused_confidence, 0.534));

    // Re-opening is the engine's doing; the audit trail holds reviewer decisions only.
    assert_eq!(engine.decision_history(&id).unwrap().len(), 1);

    let system_change = engine
        .events_since(0, 100)
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == HazardEventKind::ClusterStatusChanged)
        .find(|e| e.payload["actor"] == "system")
        .unwrap();
    assert_eq!(system_change.payload["to"], "pending");
    assert_eq!(system_change.version, reopened.version);
    assert_eq!(engine.observability().metrics.snapshot().reopened, 1);
}

#[test]
fn small_gain_leaves_needs_more_info_in_place() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 30)).unwrap();
    let id = only_cluster(&engine);
    engine
        .record_decision(&id, DecisionAction::RequestMoreInfo, None, "rev-1")
        .unwrap();

    // The second citizen step is 0.2, so the running max stays at 0.35.
    let weak = report_at(HARBOUR_PIER, SourceType::Citizen, 0.0, 0.0, 5);
    engine.submit_report(&weak).unwrap();

    let cluster = engine.get_cluster(&id).unwrap();
    assert_eq!(cluster.status, ClusterStatus::NeedsMoreInfo);
    assert!(close(cluster.fused_confidence, 0.35));
}

#[test]
fn listings_filter_by_status() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&citizen(LIGHTHOUSE, 10)).unwrap();
    let all = engine.list_clusters(None).unwrap();
    assert_eq!(engine.list_pending().unwrap().len(), 2);

    engine
        .record_decision(&all[0].id, DecisionAction::Approve, None, "rev-1")
        .unwrap();
    let pending = engine.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, all[1].id);
    let approved = engine.list_by_status(ClusterStatus::Approved).unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, all[0].id);
    assert!(engine.list_by_status(ClusterStatus::Rejected).unwrap().is_empty());
}

#[test]
fn severity_drives_the_urgent_queue() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&citizen(LIGHTHOUSE, 20)).unwrap();
    let clusters = engine.list_clusters(None).unwrap();
    let target = clusters[0].id.clone();

    assert!(engine.urgent_review_queue().unwrap().is_empty());
    let updated = engine.set_severity(&target, 5).unwrap();
    assert_eq!(updated.severity, 5);
    assert_eq!(updated.version, 2);

    let urgent = engine.urgent_review_queue().unwrap();
    assert_eq!(urgent.len(), 1);
    assert_eq!(urgent[0].id, target);
    assert_eq!(engine.review_queue().unwrap()[0].id, target);

    assert!(engine.set_severity(&target, 0).unwrap_err().is_validation());
    assert!(engine.set_severity(&target, 6).unwrap_err().is_validation());
}

#[test]
fn cluster_detail_replays_the_stored_trace() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();
    let id = only_cluster(&engine);
    engine
        .record_decision(&id, DecisionAction::RequestMoreInfo, None, "rev-1")
        .unwrap();

    let detail = engine.get_cluster_detail(&id).unwrap();
    assert_eq!(detail.member_reports.len(), 2);
    assert_eq!(detail.confidence_trace.steps.len(), 2);
    assert_eq!(detail.confidence_trace.digest, detail.cluster.trace_digest);
    assert!(close(detail.confidence_trace.fused_confidence(), 0.534));
    assert_eq!(detail.source_breakdown.len(), 2);
    assert_eq!(detail.decisions.len(), 1);
    assert!(detail.priority_score > 0.0);
    assert!(!detail.explanation.is_empty());
    assert_eq!(engine.dirty_count(), 0);

    assert!(engine
        .get_cluster_detail(&ClusterId::from("ghost"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn sub_microsecond_timestamps_replay_to_the_stored_digest() {
    let engine = engine();
    let mut s = official(HARBOUR, 5);
    s.submitted_at = s.submitted_at.with_nanosecond(214_557_538).unwrap();
    engine.submit_report(&s).unwrap();
    let cluster = engine.get_cluster(&only_cluster(&engine)).unwrap();

    let detail = engine.get_cluster_detail(&cluster.id).unwrap();
    assert_eq!(detail.confidence_trace.digest, cluster.trace_digest);
    assert_eq!(engine.dirty_count(), 0);

    let events = engine.events_since(0, 100).unwrap().len();
    assert_eq!(engine.reconcile_once().recomputed, 0);
    assert_eq!(engine.get_cluster(&cluster.id).unwrap().version, cluster.version);
    assert_eq!(engine.events_since(0, 100).unwrap().len(), events);
}

// --- Events ---

#[test]
fn committed_changes_reach_the_event_log_in_order() {
    let engine = engine();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();

    let events = engine.events_since(0, 100).unwrap();
    let kinds: Vec<HazardEventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HazardEventKind::NewReport,
            HazardEventKind::ClusterCreated,
            HazardEventKind::NewReport,
            HazardEventKind::ReportAttached,
            HazardEventKind::ClusterConfidenceUpdated,
        ]
    );
    let sequences: Vec<u64> = events.iter().filter_map(|e| e.sequence).collect();
    assert_eq!(sequences.len(), events.len());
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));

    let after_first = engine.events_since(sequences[1], 100).unwrap();
    assert_eq!(after_first.len(), 3);
}

#[test]
fn live_subscribers_see_each_commit() {
    let engine = engine();
    let mut rx = engine.subscribe();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();

    let first = rx.try_recv().unwrap();
    assert_eq!(first.kind, HazardEventKind::NewReport);
    assert!(first.sequence.is_some());
    assert_eq!(rx.try_recv().unwrap().kind, HazardEventKind::ClusterCreated);
}

#[test]
fn applier_skips_redelivered_events_during_catch_up() {
    let engine = engine();
    let mut rx = engine.subscribe();
    engine.submit_report(&citizen(HARBOUR, 20)).unwrap();
    engine.submit_report(&official(HARBOUR_PIER, 10)).unwrap();

    let mut applier = EventApplier::new();
    let mut live = 0;
    while let Ok(event) = rx.try_recv() {
        if applier.apply(&event) {
            live += 1;
        }
    }
    assert_eq!(live, 5);

    // Replaying the log after a reconnect applies nothing twice.
    let replayed = engine.events_since(0, 100).unwrap();
    assert!(replayed.iter().all(|e| !applier.apply(e)));
    assert_eq!(applier.last_sequence(), replayed.last().unwrap().sequence.unwrap());

    let id = only_cluster(&engine);
    assert_eq!(
        applier.applied_version(HazardEventKind::ClusterConfidenceUpdated, id.as_str()),
        Some(2)
    );
}

// --- Degraded ingest ---

struct FlakyClassifier {
    failed_once: std::sync::atomic::AtomicBool,
}

impl tideguard_core::traits::IClassifier for FlakyClassifier {
    fn classify(
        &self,
        _submission: &ReportSubmission,
    ) -> tideguard_core::errors::TideguardResult<tideguard_core::traits::Classification> {
        use std::sync::atomic::Ordering;
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(TideguardError::ConcurrencyError("model server timed out".into()));
        }
        Ok(tideguard_core::traits::Classification {
            hazard_type: "tides".into(),
            base_confidence: 0.55,
            credibility_score: None,
        })
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn unscored(at: (f64, f64), mins_ago: i64) -> ReportSubmission {
    let mut s = citizen(at, mins_ago);
    s.hazard_type_guess = None;
    s.base_confidence = None;
    s
}

#[test]
fn classifier_outage_degrades_then_recovers() {
    let engine = engine().with_classifier(std::sync::Arc::new(FlakyClassifier {
        failed_once: std::sync::atomic::AtomicBool::new(false),
    }));

    engine.submit_report(&unscored(HARBOUR, 20)).unwrap();
    let cluster = engine.get_cluster(&only_cluster(&engine)).unwrap();
    assert_eq!(cluster.hazard_type, "unknown");
    assert_eq!(engine.observability().active_degradations(), 1);
    assert_eq!(engine.observability().metrics.snapshot().reports_unclassified, 1);

    engine.submit_report(&unscored(LIGHTHOUSE, 10)).unwrap();
    assert_eq!(engine.observability().active_degradations(), 0);
    assert_eq!(engine.observability().metrics.snapshot().reports_unclassified, 1);
}

#[test]
fn repeated_classifier_outages_surface_as_alerts() {
    let mut config = TideguardConfig::default();
    config.observability.alert_warning_fallbacks = 2;
    // No classifier configured: every unscored report falls back.
    let engine = HazardEngine::in_memory(config).unwrap();

    engine.submit_report(&unscored(HARBOUR, 30)).unwrap();
    engine.submit_report(&unscored(LIGHTHOUSE, 20)).unwrap();
    assert!(engine.degradation_alerts().is_empty());
    engine.submit_report(&unscored((13.0601, 80.2501), 10)).unwrap();

    let alerts = engine.degradation_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].component, "classifier");
    assert_eq!(alerts[0].fallbacks_in_window, 3);

    let health = engine.health_report().unwrap();
    assert_eq!(health["active_degradations"], 3);
    assert_eq!(health["alerts"][0]["level"], "warning");
    assert_eq!(health["pending_events"], 0);
}
