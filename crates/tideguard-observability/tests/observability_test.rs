use chrono::{Duration, Utc};
use tideguard_core::config::ObservabilityConfig;
use tideguard_core::models::DegradationEvent;

use tideguard_observability::degradation::{
    evaluate_alerts, AlertLevel, AlertThresholds, DegradationTracker,
};
use tideguard_observability::tracing_setup::init_tracing;
use tideguard_observability::ObservabilityEngine;

fn event(component: &str, age_secs: i64) -> DegradationEvent {
    DegradationEvent {
        component: component.to_string(),
        failure: "classifier timeout".to_string(),
        fallback_used: "unclassified defaults".to_string(),
        timestamp: Utc::now() - Duration::seconds(age_secs),
    }
}

#[test]
fn init_tracing_is_idempotent() {
    let config = ObservabilityConfig::default();
    init_tracing(&config);
    init_tracing(&config);
    tracing::info!("still alive");
}

#[test]
fn recovery_clears_active_degradations() {
    let mut tracker = DegradationTracker::new();
    tracker.record(event("classifier", 10));
    tracker.record(event("classifier", 5));
    tracker.record(event("storage", 5));
    assert_eq!(tracker.active_degradations().len(), 3);

    tracker.mark_recovered("classifier");
    let active = tracker.active_degradations();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].event.component, "storage");
    assert!(tracker.degraded_duration("classifier", Utc::now()).is_none());
    assert!(tracker.degraded_duration("storage", Utc::now()).is_some());
}

#[test]
fn frequent_fallbacks_raise_a_warning() {
    let mut tracker = DegradationTracker::new();
    for i in 0..6 {
        tracker.record(event("classifier", 30 * i));
    }
    tracker.mark_recovered("classifier");
    let alerts = evaluate_alerts(&tracker, &AlertThresholds::default(), Utc::now());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
    assert_eq!(alerts[0].component, "classifier");
    assert_eq!(alerts[0].fallbacks_in_window, 6);
    assert_eq!(alerts[0].degraded_for_secs, None);
}

#[test]
fn unrecovered_scorer_is_critical() {
    let mut tracker = DegradationTracker::new();
    tracker.record(event("credibility_scorer", 31 * 60));
    tracker.record(event("classifier", 60));
    let alerts = evaluate_alerts(&tracker, &AlertThresholds::default(), Utc::now());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
    assert_eq!(alerts[0].component, "credibility_scorer");
}

#[test]
fn thresholds_follow_config() {
    let config = ObservabilityConfig {
        alert_window_secs: 60,
        alert_warning_fallbacks: 1,
        ..ObservabilityConfig::default()
    };
    let obs = ObservabilityEngine::from_config(&config);
    obs.record_degradation("classifier", "unavailable", "base 0.15");
    assert!(obs.degradation_alerts().is_empty());
    obs.record_degradation("classifier", "unavailable", "base 0.15");
    let alerts = obs.degradation_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
    assert_eq!(alerts[0].fallback_used, "base 0.15");
}

#[test]
fn engine_report_includes_metrics_and_degradations() {
    let obs = ObservabilityEngine::new();
    obs.metrics.record_ingested();
    obs.metrics.record_unclassified();
    obs.record_degradation("classifier", "unavailable", "base 0.15");

    let report = obs.report().unwrap();
    assert_eq!(report["metrics"]["reports_ingested"], 1);
    assert_eq!(report["metrics"]["reports_unclassified"], 1);
    assert_eq!(report["active_degradations"], 1);
    assert_eq!(obs.active_degradations(), 1);

    obs.mark_recovered("classifier");
    assert_eq!(obs.active_degradations(), 0);
}
