//! Weighted consensus over member reports: hazard type vote and centroid.

use std::collections::BTreeMap;

use tideguard_core::config::SourceWeights;
use tideguard_core::models::{GeoPoint, RawReport};

/// Hazard type with the largest weighted vote.
///
/// Vote weight is `source_weight · base_confidence · credibility`. Ties go to
/// the lexicographically smaller type. `None` for an empty member set.
pub fn consensus_hazard_type(members: &[RawReport], weights: &SourceWeights) -> Option<String> {
    let mut votes: BTreeMap<&str, f64> = BTreeMap::new();
    for r in members {
        let w = weights.weight(r.source_type) * r.base_confidence * r.credibility_score;
        *votes.entry(r.hazard_type_guess.as_str()).or_insert(0.0) += w;
    }
    // BTreeMap iterates in ascending key order; keep the first maximum.
    let mut best: Option<(&str, f64)> = None;
    for (hazard, weight) in votes {
        match best {
            Some((_, w)) if weight <= w => {}
            _ => best = Some((hazard, weight)),
        }
    }
    best.map(|(hazard, _)| hazard.to_string())
}

/// Centroid weighted by `source_weight · credibility`.
///
/// Falls back to the plain mean when every weight is zero.
pub fn weighted_centroid(members: &[RawReport], weights: &SourceWeights) -> Option<GeoPoint> {
    if members.is_empty() {
        return None;
    }
    let (mut lat, mut lon, mut total) = (0.0, 0.0, 0.0);
    for r in members {
        let w = weights.weight(r.source_type) * r.credibility_score;
        lat += r.position.lat * w;
        lon += r.position.lon * w;
        total += w;
    }
    if total > 0.0 {
        return Some(GeoPoint::new(lat / total, lon / total));
    }
    let n = members.len() as f64;
    let lat = members.iter().map(|r| r.position.lat).sum::<f64>() / n;
    let lon = members.iter().map(|r| r.position.lon).sum::<f64>() / n;
    Some(GeoPoint::new(lat, lon))
}
