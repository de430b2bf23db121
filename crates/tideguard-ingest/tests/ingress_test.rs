use std::sync::Arc;

use chrono::{Duration, TimeZone, Timelike, Utc};
use tideguard_core::config::IngestConfig;
use tideguard_core::errors::{TideguardError, TideguardResult};
use tideguard_core::models::{GeoPoint, ReportSubmission, SourceType};
use tideguard_core::traits::{Classification, IClassifier, ICredibilityScorer};
use tideguard_ingest::ReportIngress;

struct FixedClassifier;

impl IClassifier for FixedClassifier {
    fn classify(&self, _submission: &ReportSubmission) -> TideguardResult<Classification> {
        Ok(Classification {
            hazard_type: "tides".into(),
            base_confidence: 0.55,
            credibility_score: None,
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct BrokenClassifier;

impl IClassifier for BrokenClassifier {
    fn classify(&self, _submission: &ReportSubmission) -> TideguardResult<Classification> {
        Err(TideguardError::ConcurrencyError("model server timed out".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct BrokenScorer;

impl ICredibilityScorer for BrokenScorer {
    fn score(&self, _s: &ReportSubmission, _now: chrono::DateTime<Utc>) -> TideguardResult<f64> {
        Ok(7.0)
    }
}

fn unscored(source: SourceType) -> ReportSubmission {
    ReportSubmission {
        position: GeoPoint::new(13.0827, 80.2707),
        source_type: source,
        hazard_type_guess: None,
        base_confidence: None,
        credibility_score: None,
        submitted_at: Utc::now() - Duration::minutes(2),
        self_submitted_by_viewer: false,
        text: Some("sea water entering houses near the beach road".into()),
        has_media: false,
        gps_accuracy_m: Some(15.0),
    }
}

#[test]
fn scored_submission_passes_through() {
    let ingress = ReportIngress::new(IngestConfig::default());
    let s = ReportSubmission::scored(
        GeoPoint::new(13.0, 80.0),
        SourceType::Citizen,
        "flood",
        0.4,
        0.7,
        Utc::now(),
    );
    let accepted = ingress.accept(&s, Utc::now()).unwrap();
    assert_eq!(accepted.report.hazard_type_guess, "flood");
    assert_eq!(accepted.report.base_confidence, 0.4);
    assert_eq!(accepted.report.credibility_score, 0.7);
    assert!(!accepted.report.unclassified);
    assert!(accepted.degradations.is_empty());
}

#[test]
fn classifier_fills_missing_scores() {
    let ingress = ReportIngress::new(IngestConfig::default()).with_classifier(Arc::new(FixedClassifier));
    let accepted = ingress.accept(&unscored(SourceType::Citizen), Utc::now()).unwrap();
    assert_eq!(accepted.report.hazard_type_guess, "tides");
    assert_eq!(accepted.report.base_confidence, 0.55);
    assert!(accepted.report.credibility_score > 0.0);
    assert!(!accepted.report.unclassified);
}

#[test]
fn classifier_failure_falls_back_and_flags() {
    let ingress = ReportIngress::new(IngestConfig::default()).with_classifier(Arc::new(BrokenClassifier));
    let accepted = ingress.accept(&unscored(SourceType::Citizen), Utc::now()).unwrap();
    assert_eq!(accepted.report.base_confidence, 0.15);
    assert_eq!(accepted.report.hazard_type_guess, "unknown");
    assert!(accepted.report.unclassified);
    assert_eq!(accepted.degradations.len(), 1);
    assert_eq!(accepted.degradations[0].component, "classifier");
}

#[test]
fn missing_classifier_is_a_degradation() {
    let ingress = ReportIngress::new(IngestConfig::default());
    let accepted = ingress.accept(&unscored(SourceType::Social), Utc::now()).unwrap();
    assert!(accepted.report.unclassified);
    assert_eq!(accepted.report.base_confidence, 0.15);
}

#[test]
fn out_of_range_scorer_output_uses_fallback_credibility() {
    let ingress = ReportIngress::new(IngestConfig::default())
        .with_classifier(Arc::new(FixedClassifier))
        .with_scorer(Arc::new(BrokenScorer));
    let accepted = ingress.accept(&unscored(SourceType::Citizen), Utc::now()).unwrap();
    assert_eq!(accepted.report.credibility_score, 0.3);
    assert!(accepted.report.unclassified);
    assert_eq!(accepted.degradations[0].component, "credibility_scorer");
}

#[test]
fn beacon_reports_are_emergencies() {
    let ingress = ReportIngress::new(IngestConfig::default());
    let accepted = ingress.accept(&unscored(SourceType::Beacon), Utc::now()).unwrap();
    assert_eq!(accepted.report.hazard_type_guess, "emergency");
    assert_eq!(accepted.report.base_confidence, 0.99);
    assert!(!accepted.report.unclassified);
}

#[test]
fn boundary_rejects_malformed_input() {
    let ingress = ReportIngress::new(IngestConfig::default());
    let now = Utc::now();

    let mut bad_lat = unscored(SourceType::Citizen);
    bad_lat.position = GeoPoint::new(123.0, 80.0);
    assert!(ingress.accept(&bad_lat, now).unwrap_err().is_validation());

    let mut bad_score = unscored(SourceType::Citizen);
    bad_score.base_confidence = Some(1.2);
    assert!(ingress.accept(&bad_score, now).unwrap_err().is_validation());

    let mut nan_cred = unscored(SourceType::Citizen);
    nan_cred.credibility_score = Some(f64::NAN);
    assert!(ingress.accept(&nan_cred, now).unwrap_err().is_validation());

    let mut future = unscored(SourceType::Citizen);
    future.submitted_at = now + Duration::hours(2);
    assert!(ingress.accept(&future, now).unwrap_err().is_validation());

    // Within the allowed clock skew.
    let mut skewed = unscored(SourceType::Citizen);
    skewed.submitted_at = now + Duration::seconds(60);
    assert!(ingress.accept(&skewed, now).is_ok());
}

#[test]
fn report_timestamps_keep_microsecond_precision() {
    let ingress = ReportIngress::new(IngestConfig::default());
    let submitted = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap() + Duration::nanoseconds(214_557_538);
    let now = submitted + Duration::minutes(5) + Duration::nanoseconds(999);
    let s = ReportSubmission::scored(
        GeoPoint::new(13.0, 80.0),
        SourceType::Official,
        "flood",
        0.5,
        0.9,
        submitted,
    );

    let report = ingress.accept(&s, now).unwrap().report;
    assert_eq!(report.submitted_at.nanosecond(), 214_557_000);
    assert_eq!(report.received_at.nanosecond() % 1_000, 0);
    assert!(report.received_at <= now);
}
