use chrono::Utc;
use proptest::prelude::*;
use tideguard_core::models::{
    ClusterId, ClusterStatus, DecisionAction, GeoPoint, GridCell, HazardCluster,
};
use tideguard_lifecycle::LifecycleManager;

fn status_strategy() -> impl Strategy<Value = ClusterStatus> {
    prop_oneof![
        Just(ClusterStatus::Pending),
        Just(ClusterStatus::Approved),
        Just(ClusterStatus::Rejected),
        Just(ClusterStatus::NeedsMoreInfo),
    ]
}

fn action_strategy() -> impl Strategy<Value = DecisionAction> {
    prop_oneof![
        Just(DecisionAction::Approve),
        Just(DecisionAction::Reject),
        Just(DecisionAction::RequestMoreInfo),
    ]
}

fn cluster(status: ClusterStatus, fused: f64) -> HazardCluster {
    let now = Utc::now();
    let centroid = GeoPoint::new(13.08, 80.27);
    HazardCluster {
        id: ClusterId::from("c1"),
        hazard_type: "flood".into(),
        centroid,
        cell: GridCell::from_point(centroid, 3),
        severity: 3,
        status,
        fused_confidence: fused,
        member_report_ids: Vec::new(),
        created_at: now,
        updated_at: now,
        last_report_at: now,
        needs_info_baseline: None,
        version: 1,
        trace_digest: String::new(),
    }
}

proptest! {
    #[test]
    fn prop_terminal_clusters_never_move(
        start in status_strategy(),
        actions in prop::collection::vec(action_strategy(), 1..8),
        fused in 0.0f64..0.95,
    ) {
        let mgr = LifecycleManager::default();
        let mut current = cluster(start, fused);
        for action in actions {
            let was_terminal = current.status.is_terminal();
            match mgr.plan_decision(&current, action, None, "rev", Utc::now()) {
                Ok(plan) => {
                    prop_assert!(!was_terminal);
                    prop_assert_eq!(plan.cluster.version, current.version + 1);
                    current = plan.cluster;
                }
                Err(err) => {
                    prop_assert!(was_terminal);
                    prop_assert!(err.is_conflict());
                }
            }
        }
    }
}
