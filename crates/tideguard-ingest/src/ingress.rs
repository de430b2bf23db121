use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tideguard_core::config::IngestConfig;
use tideguard_core::errors::{TideguardError, TideguardResult};
use tideguard_core::models::{DegradationEvent, RawReport, ReportId, ReportSubmission, SourceType};
use tideguard_core::traits::{Classification, IClassifier, ICredibilityScorer};

use crate::credibility::CredibilityScorer;

/// A report accepted at the boundary, plus any fallbacks that were needed.
#[derive(Debug, Clone)]
pub struct IngestedReport {
    pub report: RawReport,
    pub degradations: Vec<DegradationEvent>,
}

/// Report ingress boundary.
pub struct ReportIngress {
    config: IngestConfig,
    classifier: Option<Arc<dyn IClassifier>>,
    scorer: Arc<dyn ICredibilityScorer>,
}

fn check_unit(name: &str, value: f64) -> TideguardResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(TideguardError::validation(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn degradation(component: &str, failure: String, fallback: String, now: DateTime<Utc>) -> DegradationEvent {
    DegradationEvent {
        component: component.to_string(),
        failure,
        fallback_used: fallback,
        timestamp: now,
    }
}

impl ReportIngress {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            classifier: None,
            scorer: Arc::new(CredibilityScorer::new()),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ICredibilityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Reject anything that must never reach the deduplicator.
    pub fn validate(&self, submission: &ReportSubmission, now: DateTime<Utc>) -> TideguardResult<()> {
        submission.position.validate()?;
        if let Some(base) = submission.base_confidence {
            check_unit("base_confidence", base)?;
        }
        if let Some(cred) = submission.credibility_score {
            check_unit("credibility_score", cred)?;
        }
        if let Some(hazard) = &submission.hazard_type_guess {
            if hazard.trim().is_empty() {
                return Err(TideguardError::validation("hazard_type_guess must not be blank"));
            }
        }
        if submission.submitted_at > now + Duration::seconds(self.config.max_clock_skew_secs) {
            return Err(TideguardError::validation(format!(
                "submitted_at {} is in the future",
                submission.submitted_at.to_rfc3339()
            )));
        }
        Ok(())
    }

    /// Validate, score, and build the immutable report.
    ///
    /// Report timestamps are cut to whole microseconds, the precision storage
    /// keeps, so a trace replayed from stored members hashes the same.
    pub fn accept(&self, submission: &ReportSubmission, now: DateTime<Utc>) -> TideguardResult<IngestedReport> {
        self.validate(submission, now)?;
        let now = now.trunc_subsecs(6);

        let mut degradations = Vec::new();
        let mut unclassified = false;

        let (hazard_type, base_confidence, classifier_credibility) =
            if self.config.beacon_override && submission.source_type == SourceType::Beacon {
                (
                    self.config.beacon_hazard_type.clone(),
                    self.config.beacon_base_confidence,
                    None,
                )
            } else {
                match (&submission.hazard_type_guess, submission.base_confidence) {
                    (Some(hazard), Some(base)) => (hazard.clone(), base, None),
                    _ => match self.classify(submission) {
                        Ok(c) => (
                            submission.hazard_type_guess.clone().unwrap_or(c.hazard_type),
                            submission.base_confidence.unwrap_or(c.base_confidence),
                            c.credibility_score,
                        ),
                        Err(e) => {
                            unclassified = true;
                            degradations.push(degradation(
                                "classifier",
                                e.to_string(),
                                format!("base confidence {}", self.config.unclassified_base_confidence),
                                now,
                            ));
                            (
                                submission
                                    .hazard_type_guess
                                    .clone()
                                    .unwrap_or_else(|| self.config.unknown_hazard_type.clone()),
                                submission
                                    .base_confidence
                                    .unwrap_or(self.config.unclassified_base_confidence),
                                None,
                            )
                        }
                    },
                }
            };

        let credibility_score = match submission.credibility_score.or(classifier_credibility) {
            Some(c) => c,
            None => match self.scorer.score(submission, now).and_then(|c| {
                check_unit("credibility_score", c)?;
                Ok(c)
            }) {
                Ok(c) => c,
                Err(e) => {
                    unclassified = true;
                    degradations.push(degradation(
                        "credibility_scorer",
                        e.to_string(),
                        format!("credibility {}", self.config.fallback_credibility),
                        now,
                    ));
                    self.config.fallback_credibility
                }
            },
        };

        let report = RawReport {
            id: ReportId::generate(),
            source_type: submission.source_type,
            submitted_at: submission.submitted_at.trunc_subsecs(6),
            received_at: now,
            position: submission.position,
            hazard_type_guess: hazard_type,
            base_confidence,
            credibility_score,
            self_submitted_by_viewer: submission.self_submitted_by_viewer,
            unclassified,
        };

        tracing::debug!(
            report_id = %report.id,
            source_type = %report.source_type,
            hazard_type = %report.hazard_type_guess,
            base_confidence = report.base_confidence,
            credibility = report.credibility_score,
            unclassified,
            "report accepted at ingress"
        );

        Ok(IngestedReport {
            report,
            degradations,
        })
    }

    /// Run the external classifier and range-check what it returns.
    fn classify(&self, submission: &ReportSubmission) -> TideguardResult<Classification> {
        let classifier = self.classifier.as_ref().ok_or_else(|| TideguardError::DegradedMode {
            component: "classifier".to_string(),
            fallback: "no classifier configured".to_string(),
        })?;
        let c = classifier.classify(submission)?;
        check_unit("classifier base_confidence", c.base_confidence)?;
        if let Some(cred) = c.credibility_score {
            check_unit("classifier credibility_score", cred)?;
        }
        if c.hazard_type.trim().is_empty() {
            return Err(TideguardError::validation(format!(
                "classifier {} returned a blank hazard type",
                classifier.name()
            )));
        }
        Ok(c)
    }
}
