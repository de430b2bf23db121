use chrono::Utc;
use tideguard_core::config::LifecycleConfig;
use tideguard_core::models::{
    ClusterId, ClusterStatus, DecisionAction, GeoPoint, GridCell, HazardCluster, ReportId,
};
use tideguard_lifecycle::LifecycleManager;

fn cluster(id: &str, status: ClusterStatus, fused: f64, severity: u8) -> HazardCluster {
    let now = Utc::now();
    let centroid = GeoPoint::new(13.08, 80.27);
    HazardCluster {
        id: ClusterId::from(id),
        hazard_type: "flood".into(),
        centroid,
        cell: GridCell::from_point(centroid, 3),
        severity,
        status,
        fused_confidence: fused,
        member_report_ids: vec![ReportId::from("r1")],
        created_at: now,
        updated_at: now,
        last_report_at: now,
        needs_info_baseline: None,
        version: 4,
        trace_digest: String::new(),
    }
}

#[test]
fn approve_builds_next_state_and_audit_record() {
    let mgr = LifecycleManager::default();
    let c = cluster("c1", ClusterStatus::Pending, 0.6, 3);
    let now = Utc::now();
    let plan = mgr
        .plan_decision(&c, DecisionAction::Approve, Some("confirmed by patrol"), "rev-1", now)
        .unwrap();

    assert_eq!(plan.expected_version, 4);
    assert_eq!(plan.cluster.version, 5);
    assert_eq!(plan.cluster.status, ClusterStatus::Approved);
    assert_eq!(plan.cluster.updated_at, now);
    assert_eq!(plan.decision.from_status, ClusterStatus::Pending);
    assert_eq!(plan.decision.to_status, ClusterStatus::Approved);
    assert_eq!(plan.decision.notes.as_deref(), Some("confirmed by patrol"));
    assert_eq!(plan.decision.fused_confidence_at_decision, 0.6);
    // Input untouched.
    assert_eq!(c.status, ClusterStatus::Pending);
}

#[test]
fn terminal_cluster_is_a_conflict() {
    let mgr = LifecycleManager::default();
    for status in [ClusterStatus::Approved, ClusterStatus::Rejected] {
        let c = cluster("c1", status, 0.6, 3);
        let err = mgr
            .plan_decision(&c, DecisionAction::RequestMoreInfo, None, "rev-1", Utc::now())
            .unwrap_err();
        assert!(err.is_conflict());
    }
}

#[test]
fn reviewer_and_notes_are_validated_first() {
    let mgr = LifecycleManager::default();
    let c = cluster("c1", ClusterStatus::Approved, 0.6, 3);
    // Validation runs before the terminal check.
    let err = mgr
        .plan_decision(&c, DecisionAction::Approve, None, "  ", Utc::now())
        .unwrap_err();
    assert!(err.is_validation());

    let long = "x".repeat(4_001);
    let c = cluster("c2", ClusterStatus::Pending, 0.6, 3);
    let err = mgr
        .plan_decision(&c, DecisionAction::Approve, Some(&long), "rev", Utc::now())
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn request_more_info_records_baseline_and_reopens_on_delta() {
    let mgr = LifecycleManager::default();
    let c = cluster("c1", ClusterStatus::Pending, 0.4, 3);
    let plan = mgr
        .plan_decision(&c, DecisionAction::RequestMoreInfo, None, "rev", Utc::now())
        .unwrap();
    let mut waiting = plan.cluster;
    assert_eq!(waiting.needs_info_baseline, Some(0.4));

    waiting.fused_confidence = 0.45;
    assert!(!mgr.on_confidence_update(&mut waiting).unwrap());
    assert_eq!(waiting.status, ClusterStatus::NeedsMoreInfo);

    waiting.fused_confidence = 0.5;
    assert!(mgr.on_confidence_update(&mut waiting).unwrap());
    assert_eq!(waiting.status, ClusterStatus::Pending);
    assert_eq!(waiting.needs_info_baseline, None);
}

#[test]
fn repeated_request_refreshes_baseline() {
    let mgr = LifecycleManager::default();
    let mut c = cluster("c1", ClusterStatus::NeedsMoreInfo, 0.55, 3);
    c.needs_info_baseline = Some(0.4);
    let plan = mgr
        .plan_decision(&c, DecisionAction::RequestMoreInfo, None, "rev", Utc::now())
        .unwrap();
    assert_eq!(plan.cluster.needs_info_baseline, Some(0.55));
    assert_eq!(plan.decision.from_status, ClusterStatus::NeedsMoreInfo);
}

#[test]
fn urgent_queue_orders_by_severity_then_confidence() {
    let mgr = LifecycleManager::new(LifecycleConfig::default());
    let clusters = vec![
        cluster("calm", ClusterStatus::Pending, 0.3, 2),
        cluster("severe", ClusterStatus::Pending, 0.3, 5),
        cluster("corroborated", ClusterStatus::NeedsMoreInfo, 0.85, 3),
        cluster("done", ClusterStatus::Approved, 0.9, 5),
        cluster("severe-strong", ClusterStatus::Pending, 0.7, 5),
    ];
    let ids: Vec<String> = mgr
        .urgent_review_queue(clusters)
        .into_iter()
        .map(|c| c.id.to_string())
        .collect();
    assert_eq!(ids, vec!["severe-strong", "severe", "corroborated"]);
}

#[test]
fn severity_is_range_checked() {
    let mgr = LifecycleManager::default();
    let c = cluster("c1", ClusterStatus::Pending, 0.3, 3);
    assert!(mgr.plan_severity(&c, 0, Utc::now()).unwrap_err().is_validation());
    assert!(mgr.plan_severity(&c, 6, Utc::now()).is_err());
    let next = mgr.plan_severity(&c, 5, Utc::now()).unwrap();
    assert_eq!(next.severity, 5);
    assert_eq!(next.version, 5);
}
