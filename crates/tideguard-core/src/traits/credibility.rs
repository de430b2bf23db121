use chrono::{DateTime, Utc};

use crate::errors::TideguardResult;
use crate::models::ReportSubmission;

/// Scores how far a single report can be trusted, in [0, 1].
pub trait ICredibilityScorer: Send + Sync {
    fn score(&self, submission: &ReportSubmission, now: DateTime<Utc>) -> TideguardResult<f64>;
}
