use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tideguard_core::config::DedupConfig;
use tideguard_core::models::{
    ClusterId, ClusterStatus, GeoPoint, GridCell, HazardCluster, RawReport, ReportId, SourceType,
};
use tideguard_dedup::{Deduplicator, MarkerCandidates};

/// 2K clusters and 10K reports spread over roughly 3K cells.
fn build_candidates() -> MarkerCandidates {
    let now = Utc::now();
    let clusters = (0..2_000)
        .map(|i| {
            let pos = GeoPoint::new(12.0 + (i % 50) as f64 * 0.001, 80.0 + (i / 50) as f64 * 0.001);
            HazardCluster {
                id: ClusterId::from(format!("c{i}")),
                hazard_type: "flood".into(),
                centroid: pos,
                cell: GridCell::from_point(pos, 3),
                severity: 3,
                status: ClusterStatus::Pending,
                fused_confidence: (i % 95) as f64 / 100.0,
                member_report_ids: Vec::new(),
                created_at: now,
                updated_at: now,
                last_report_at: now,
                needs_info_baseline: None,
                version: 1,
                trace_digest: String::new(),
            }
        })
        .collect();
    let reports: Vec<RawReport> = (0..10_000)
        .map(|i| {
            let at = now - Duration::minutes(i % 90);
            RawReport {
                id: ReportId::from(format!("r{i}")),
                source_type: SourceType::Citizen,
                submitted_at: at,
                received_at: at,
                position: GeoPoint::new(12.0 + (i % 60) as f64 * 0.001, 80.0 + (i / 200) as f64 * 0.001),
                hazard_type_guess: "flood".into(),
                base_confidence: 0.5,
                credibility_score: 0.5,
                self_submitted_by_viewer: i % 17 == 0,
                unclassified: false,
            }
        })
        .collect();
    let viewer = reports.iter().filter(|r| r.self_submitted_by_viewer).cloned().collect();
    MarkerCandidates {
        clusters,
        unattached_reports: reports,
        self_submitted_reports: viewer,
        seed_reports: Vec::new(),
    }
}

fn bench_compute_markers(c: &mut Criterion) {
    let candidates = build_candidates();
    let dedup = Deduplicator::new(DedupConfig::default());
    let now = Utc::now();
    c.bench_function("compute_markers_12k_candidates", |b| {
        b.iter(|| dedup.compute_markers(black_box(&candidates), now, 50))
    });
}

criterion_group!(benches, bench_compute_markers);
criterion_main!(benches);
