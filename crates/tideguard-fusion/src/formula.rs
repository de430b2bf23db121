//! Progressive fusion formula, evaluated once per member in replay order.
//!
//! ```text
//! boost_i      = min(i · boost_step, boost_cap)
//! cred_i       = credibility_i · credibility_weight
//! step_i       = min(base_i + boost_i + cred_i, ceiling)
//! diversity_i  = 1.0                                   if 1 source type so far
//!              = min(types · diversity_step, div_cap)  otherwise
//! raw_i        = min(step_i · diversity_i, ceiling)
//! cumulative_i = max(cumulative_{i-1}, raw_i)
//! ```

use std::collections::BTreeSet;

use tideguard_core::config::FusionConfig;
use tideguard_core::models::{
    ClusterId, ConfidenceStep, ConfidenceTrace, ContributionBreakdown, RawReport, SourceType,
};

/// Volume bonus for the `step_index`-th report (1-based).
pub fn progressive_boost(step_index: usize, config: &FusionConfig) -> f64 {
    (step_index as f64 * config.boost_step).min(config.boost_cap)
}

pub fn credibility_term(credibility: f64, config: &FusionConfig) -> f64 {
    credibility * config.credibility_weight
}

/// Diversity multiplier for the number of distinct source types seen so far.
pub fn diversity_factor(distinct_sources: usize, config: &FusionConfig) -> f64 {
    if distinct_sources <= 1 {
        1.0
    } else {
        (distinct_sources as f64 * config.diversity_step).min(config.diversity_cap)
    }
}

/// Members in replay order: `submitted_at` ascending, report id on ties.
pub fn replay_order(members: &[RawReport]) -> Vec<&RawReport> {
    let mut ordered: Vec<&RawReport> = members.iter().collect();
    ordered.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

/// Replay `members` and return every step. An empty member set yields an empty trace.
pub fn compute_trace(
    cluster_id: &ClusterId,
    members: &[RawReport],
    config: &FusionConfig,
) -> ConfidenceTrace {
    let ceiling = config.confidence_ceiling;
    let mut seen: BTreeSet<SourceType> = BTreeSet::new();
    let mut cumulative = 0.0_f64;
    let mut steps = Vec::with_capacity(members.len());

    for (i, report) in replay_order(members).into_iter().enumerate() {
        let step_index = i + 1;
        seen.insert(report.source_type);

        let boost = progressive_boost(step_index, config);
        let cred = credibility_term(report.credibility_score, config);
        let step_confidence = (report.base_confidence + boost + cred).min(ceiling);
        let diversity = diversity_factor(seen.len(), config);
        let raw = (step_confidence * diversity).min(ceiling);
        cumulative = cumulative.max(raw);

        steps.push(ConfidenceStep {
            step_index,
            report_id: report.id.clone(),
            timestamp_at_step: report.submitted_at,
            step_confidence,
            distinct_sources: seen.len(),
            raw_confidence: raw,
            cumulative_confidence: cumulative,
            contribution: ContributionBreakdown {
                source_type: report.source_type,
                base_confidence: report.base_confidence,
                progressive_boost: boost,
                credibility_term: cred,
                diversity_factor: diversity,
            },
        });
    }

    ConfidenceTrace::new(cluster_id.clone(), steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_is_capped() {
        let config = FusionConfig::default();
        assert!((progressive_boost(1, &config) - 0.1).abs() < 1e-12);
        assert!((progressive_boost(4, &config) - 0.4).abs() < 1e-12);
        assert!((progressive_boost(9, &config) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn diversity_is_neutral_for_one_source_and_capped_above() {
        let config = FusionConfig::default();
        assert_eq!(diversity_factor(1, &config), 1.0);
        assert!((diversity_factor(2, &config) - 0.6).abs() < 1e-12);
        assert!((diversity_factor(3, &config) - 0.9).abs() < 1e-12);
        assert!((diversity_factor(4, &config) - 1.2).abs() < 1e-12);
    }
}
