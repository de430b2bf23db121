//! Weighted multi-feature credibility scoring.
//!
//! | feature               | weight |
//! |-----------------------|--------|
//! | source reliability    | 0.40   |
//! | media presence        | 0.15   |
//! | GPS accuracy          | 0.15   |
//! | text quality          | 0.15   |
//! | temporal consistency  | 0.10   |
//! | past accuracy         | 0.05   |

pub mod features;
pub mod text_quality;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tideguard_core::errors::TideguardResult;
use tideguard_core::models::ReportSubmission;
use tideguard_core::traits::ICredibilityScorer;

const W_SOURCE: f64 = 0.4;
const W_MEDIA: f64 = 0.15;
const W_GPS: f64 = 0.15;
const W_TEXT: f64 = 0.15;
const W_TEMPORAL: f64 = 0.1;
const W_PAST: f64 = 0.05;

/// Individual feature scores, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityFeatures {
    pub source_reliability: f64,
    pub media_presence: f64,
    pub gps_accuracy: f64,
    pub text_quality: f64,
    pub temporal_consistency: f64,
    pub past_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityAssessment {
    pub score: f64,
    pub features: CredibilityFeatures,
    pub explanation: String,
}

/// Default credibility scorer, used when a submission carries no score.
#[derive(Debug, Clone, Default)]
pub struct CredibilityScorer;

impl CredibilityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, submission: &ReportSubmission, now: DateTime<Utc>) -> CredibilityAssessment {
        let features = CredibilityFeatures {
            source_reliability: features::source_reliability(submission.source_type),
            media_presence: features::media_presence(submission.has_media),
            gps_accuracy: features::gps_accuracy(submission.gps_accuracy_m),
            text_quality: text_quality::score(submission.text.as_deref().unwrap_or_default()),
            temporal_consistency: features::temporal_consistency(submission.submitted_at, now),
            past_accuracy: features::past_accuracy(),
        };

        let total = W_SOURCE + W_MEDIA + W_GPS + W_TEXT + W_TEMPORAL + W_PAST;
        let weighted = features.source_reliability * W_SOURCE
            + features.media_presence * W_MEDIA
            + features.gps_accuracy * W_GPS
            + features.text_quality * W_TEXT
            + features.temporal_consistency * W_TEMPORAL
            + features.past_accuracy * W_PAST;
        let score = (weighted / total).clamp(0.0, 1.0);

        CredibilityAssessment {
            score,
            explanation: explain(&features),
            features,
        }
    }
}

impl ICredibilityScorer for CredibilityScorer {
    fn score(&self, submission: &ReportSubmission, now: DateTime<Utc>) -> TideguardResult<f64> {
        Ok(self.assess(submission, now).score)
    }
}

fn explain(f: &CredibilityFeatures) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if f.source_reliability >= 0.8 {
        parts.push("reliable source");
    } else if f.source_reliability <= 0.4 {
        parts.push("unreliable source");
    }
    if f.media_presence >= 0.7 {
        parts.push("has media evidence");
    }
    if f.gps_accuracy >= 0.8 {
        parts.push("accurate location");
    } else if f.gps_accuracy <= 0.4 {
        parts.push("poor location data");
    }
    if f.text_quality >= 0.7 {
        parts.push("detailed description");
    } else if f.text_quality <= 0.4 {
        parts.push("poor description quality");
    }
    if f.temporal_consistency >= 0.8 {
        parts.push("recent report");
    } else if f.temporal_consistency <= 0.4 {
        parts.push("outdated report");
    }
    if parts.is_empty() {
        "average credibility".to_string()
    } else {
        parts.join("; ")
    }
}
