use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::SourceType;

/// Per-source reliability weights used by the consensus vote and the centroid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub citizen: f64,
    pub official: f64,
    pub social: f64,
    pub beacon: f64,
}

impl SourceWeights {
    pub fn weight(&self, source: SourceType) -> f64 {
        match source {
            SourceType::Citizen => self.citizen,
            SourceType::Official => self.official,
            SourceType::Social => self.social,
            SourceType::Beacon => self.beacon,
        }
    }
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            citizen: defaults::DEFAULT_SOURCE_WEIGHT_CITIZEN,
            official: defaults::DEFAULT_SOURCE_WEIGHT_OFFICIAL,
            social: defaults::DEFAULT_SOURCE_WEIGHT_SOCIAL,
            beacon: defaults::DEFAULT_SOURCE_WEIGHT_BEACON,
        }
    }
}

/// Confidence fusion configuration.
///
/// The defaults are the values observed in the field deployment; none of them
/// has been tuned against labeled data yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Corroboration-by-volume increment per step.
    pub boost_step: f64,
    /// Upper bound on the volume boost.
    pub boost_cap: f64,
    /// Multiplier applied to each report's credibility.
    pub credibility_weight: f64,
    /// Diversity factor contributed per distinct source type (2+ types).
    pub diversity_step: f64,
    /// Upper bound on the diversity factor.
    pub diversity_cap: f64,
    /// Ceiling for every step and for the fused result.
    pub confidence_ceiling: f64,
    /// Source reliability weights.
    pub source_weights: SourceWeights,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            boost_step: defaults::DEFAULT_BOOST_STEP,
            boost_cap: defaults::DEFAULT_BOOST_CAP,
            credibility_weight: defaults::DEFAULT_CREDIBILITY_WEIGHT,
            diversity_step: defaults::DEFAULT_DIVERSITY_STEP,
            diversity_cap: defaults::DEFAULT_DIVERSITY_CAP,
            confidence_ceiling: defaults::DEFAULT_CONFIDENCE_CEILING,
            source_weights: SourceWeights::default(),
        }
    }
}
