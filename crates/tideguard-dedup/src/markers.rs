//! Unified marker selection: one visible representative per grid cell.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use tideguard_core::config::DedupConfig;
use tideguard_core::models::{
    ClusterStatus, GridCell, HazardCluster, MarkerKind, MarkerRef, RawReport, ReportId,
    UnifiedMarker,
};

/// Everything the marker pass looks at.
#[derive(Debug, Clone, Default)]
pub struct MarkerCandidates {
    pub clusters: Vec<HazardCluster>,
    /// Reports not yet attached to any cluster.
    pub unattached_reports: Vec<RawReport>,
    /// Viewer-submitted reports, attached or not. Only recent ones are used.
    pub self_submitted_reports: Vec<RawReport>,
    /// Seed reports of clusters that have a single member.
    pub seed_reports: Vec<RawReport>,
}

impl MarkerCandidates {
    pub fn len(&self) -> usize {
        self.clusters.len()
            + self.unattached_reports.len()
            + self.self_submitted_reports.len()
            + self.seed_reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Best cluster in a cell: higher fused confidence, later last report, lower id.
fn cluster_precedence(a: &HazardCluster, b: &HazardCluster) -> Ordering {
    b.fused_confidence
        .total_cmp(&a.fused_confidence)
        .then_with(|| b.last_report_at.cmp(&a.last_report_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Best override report in a cell: later submission, lower id.
fn override_precedence(a: &RawReport, b: &RawReport) -> Ordering {
    b.submitted_at
        .cmp(&a.submitted_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Best unattached report in an empty cell: viewer's own first, earlier, lower id.
fn standalone_precedence(a: &RawReport, b: &RawReport) -> Ordering {
    b.self_submitted_by_viewer
        .cmp(&a.self_submitted_by_viewer)
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Keep the entry that sorts first under `precedence`.
fn keep_best<'a, T>(
    slot: &mut BTreeMap<GridCell, &'a T>,
    cell: GridCell,
    item: &'a T,
    precedence: fn(&T, &T) -> Ordering,
) {
    slot.entry(cell)
        .and_modify(|current| {
            if precedence(item, *current) == Ordering::Less {
                *current = item;
            }
        })
        .or_insert(item);
}

/// Collapse clusters and reports into at most one marker per cell.
///
/// Winners are ordered by priority (descending) then cell key (ascending) and
/// truncated to `min(limit, marker_cap)`. Rejected clusters are not shown.
pub fn compute_markers(
    candidates: &MarkerCandidates,
    now: DateTime<Utc>,
    limit: usize,
    config: &DedupConfig,
) -> Vec<UnifiedMarker> {
    let precision = config.grid_precision_decimals;
    let cell_of = |r: &RawReport| GridCell::from_point(r.position, precision);

    let mut clusters: BTreeMap<GridCell, &HazardCluster> = BTreeMap::new();
    for cluster in &candidates.clusters {
        if cluster.status == ClusterStatus::Rejected {
            continue;
        }
        keep_best(&mut clusters, cluster.cell, cluster, cluster_precedence);
    }

    let window_start = now - Duration::seconds(config.self_override_window_secs);
    let mut overrides: BTreeMap<GridCell, &RawReport> = BTreeMap::new();
    for report in &candidates.self_submitted_reports {
        if !report.self_submitted_by_viewer || report.submitted_at < window_start {
            continue;
        }
        let cell = cell_of(report);
        match clusters.get(&cell) {
            // The viewer's report is the whole cluster; nothing to override.
            Some(cluster) if cluster.member_report_ids == [report.id.clone()] => {}
            Some(_) => keep_best(&mut overrides, cell, report, override_precedence),
            None => {}
        }
    }

    let mut standalone: BTreeMap<GridCell, &RawReport> = BTreeMap::new();
    for report in &candidates.unattached_reports {
        let cell = cell_of(report);
        if !clusters.contains_key(&cell) {
            keep_best(&mut standalone, cell, report, standalone_precedence);
        }
    }

    // An uncorroborated cluster ranks like the report that seeded it.
    let seeded_by_viewer: HashMap<&ReportId, bool> = candidates
        .seed_reports
        .iter()
        .map(|r| (&r.id, r.self_submitted_by_viewer))
        .collect();
    let cluster_priority = |cluster: &HazardCluster| match cluster.member_report_ids.as_slice() {
        [seed] if seeded_by_viewer.get(seed).copied().unwrap_or(false) => {
            config.self_report_priority
        }
        [_] => config.report_priority,
        _ => config.cluster_priority,
    };

    let mut markers: Vec<UnifiedMarker> =
        Vec::with_capacity(clusters.len() + standalone.len());

    for (cell, cluster) in &clusters {
        let marker = match overrides.get(cell) {
            Some(report) => UnifiedMarker {
                position: report.position,
                cell: *cell,
                kind: MarkerKind::StandaloneReport,
                priority: config.self_override_priority,
                confidence_for_display: report.base_confidence,
                target: MarkerRef::Report(report.id.clone()),
            },
            None => UnifiedMarker {
                position: cluster.centroid,
                cell: *cell,
                kind: MarkerKind::Cluster,
                priority: cluster_priority(cluster),
                confidence_for_display: cluster.fused_confidence,
                target: MarkerRef::Cluster(cluster.id.clone()),
            },
        };
        markers.push(marker);
    }

    for (cell, report) in &standalone {
        let priority = if report.self_submitted_by_viewer {
            config.self_report_priority
        } else {
            config.report_priority
        };
        markers.push(UnifiedMarker {
            position: report.position,
            cell: *cell,
            kind: MarkerKind::StandaloneReport,
            priority,
            confidence_for_display: report.base_confidence,
            target: MarkerRef::Report(report.id.clone()),
        });
    }

    markers.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.cell.key().cmp(&b.cell.key()))
    });
    markers.truncate(limit.min(config.marker_cap));

    tracing::debug!(
        candidates = candidates.len(),
        markers = markers.len(),
        "markers computed"
    );
    markers
}
