use std::collections::BTreeMap;

use tideguard_core::models::{RawReport, SourceBreakdown, SourceStats, SourceType};

/// Per-source-type count and averages.
pub fn source_breakdown(members: &[RawReport]) -> SourceBreakdown {
    let mut sums: BTreeMap<SourceType, (usize, f64, f64)> = BTreeMap::new();
    for r in members {
        let entry = sums.entry(r.source_type).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += r.base_confidence;
        entry.2 += r.credibility_score;
    }
    sums.into_iter()
        .map(|(source, (count, base, cred))| {
            let n = count as f64;
            (
                source,
                SourceStats {
                    count,
                    average_base_confidence: base / n,
                    average_credibility: cred / n,
                },
            )
        })
        .collect()
}
