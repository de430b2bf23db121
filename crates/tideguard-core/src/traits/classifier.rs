use serde::{Deserialize, Serialize};

use crate::errors::TideguardResult;
use crate::models::ReportSubmission;

/// Output of the external hazard classifier for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub hazard_type: String,
    pub base_confidence: f64,
    /// Some classifiers also score credibility; `None` defers to the scorer.
    pub credibility_score: Option<f64>,
}

/// External hazard-type classifier. Treated as an opaque function.
pub trait IClassifier: Send + Sync {
    /// Classify a submission. Errors are absorbed by ingress as "missing score".
    fn classify(&self, submission: &ReportSubmission) -> TideguardResult<Classification>;

    /// Name used in logs and degradation events.
    fn name(&self) -> &str;
}
