use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, ReportId};
use crate::errors::TideguardError;

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A member of the public submitting through the app.
    Citizen,
    /// A bulletin from an official agency.
    Official,
    /// A social-media mention.
    Social,
    /// A device or SOS beacon.
    Beacon,
}

impl SourceType {
    pub const ALL: [SourceType; 4] = [
        SourceType::Citizen,
        SourceType::Official,
        SourceType::Social,
        SourceType::Beacon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Citizen => "citizen",
            SourceType::Official => "official",
            SourceType::Social => "social",
            SourceType::Beacon => "beacon",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = TideguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(SourceType::Citizen),
            "official" => Ok(SourceType::Official),
            "social" => Ok(SourceType::Social),
            "beacon" => Ok(SourceType::Beacon),
            other => Err(TideguardError::validation(format!(
                "unknown source type: {other}"
            ))),
        }
    }
}

/// A single observation. Immutable once accepted by ingress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub id: ReportId,
    pub source_type: SourceType,
    pub submitted_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub position: GeoPoint,
    pub hazard_type_guess: String,
    /// Classifier confidence in `hazard_type_guess`, in [0, 1].
    pub base_confidence: f64,
    /// How far the report itself can be trusted, in [0, 1].
    pub credibility_score: f64,
    pub self_submitted_by_viewer: bool,
    /// Set when classifier or credibility defaults were substituted.
    pub unclassified: bool,
}

/// What Report Ingress hands the engine. Scores are optional: missing ones
/// are filled by the classifier and the credibility scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub position: GeoPoint,
    pub source_type: SourceType,
    #[serde(default)]
    pub hazard_type_guess: Option<String>,
    #[serde(default)]
    pub base_confidence: Option<f64>,
    #[serde(default)]
    pub credibility_score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub self_submitted_by_viewer: bool,
    /// Free text of the observation, if any. Only read by scorers.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub has_media: bool,
    /// Reported GPS accuracy in meters.
    #[serde(default)]
    pub gps_accuracy_m: Option<f64>,
}

impl ReportSubmission {
    /// A submission that already carries classifier output.
    pub fn scored(
        position: GeoPoint,
        source_type: SourceType,
        hazard_type: &str,
        base_confidence: f64,
        credibility_score: f64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            position,
            source_type,
            hazard_type_guess: Some(hazard_type.to_string()),
            base_confidence: Some(base_confidence),
            credibility_score: Some(credibility_score),
            submitted_at,
            self_submitted_by_viewer: false,
            text: None,
            has_media: false,
            gps_accuracy_m: None,
        }
    }

    pub fn by_viewer(mut self) -> Self {
        self.self_submitted_by_viewer = true;
        self
    }
}
