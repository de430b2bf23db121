use chrono::{Duration, Utc};
use proptest::prelude::*;
use tideguard_core::models::{GeoPoint, ReportSubmission, SourceType};
use tideguard_ingest::CredibilityScorer;

proptest! {
    #[test]
    fn prop_credibility_is_a_unit_score(
        source in 0usize..4,
        text in ".{0,600}",
        has_media in any::<bool>(),
        gps in prop::option::of(0.0f64..1_000.0),
        age_mins in -60i64..100_000,
    ) {
        let now = Utc::now();
        let submission = ReportSubmission {
            position: GeoPoint::new(13.08, 80.27),
            source_type: SourceType::ALL[source],
            hazard_type_guess: None,
            base_confidence: None,
            credibility_score: None,
            submitted_at: now - Duration::minutes(age_mins),
            self_submitted_by_viewer: false,
            text: Some(text),
            has_media,
            gps_accuracy_m: gps,
        };
        let assessment = CredibilityScorer::new().assess(&submission, now);
        prop_assert!((0.0..=1.0).contains(&assessment.score));
        prop_assert!(!assessment.explanation.is_empty());
    }
}
