use chrono::{DateTime, Utc};
use tideguard_core::config::DedupConfig;
use tideguard_core::models::{GeoPoint, GridCell, HazardCluster, RawReport, UnifiedMarker};

use crate::assign::{self, Assignment};
use crate::markers::{self, MarkerCandidates};

/// Configured entry point to the grid deduplicator.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn cell_of(&self, point: GeoPoint) -> GridCell {
        GridCell::from_point(point, self.config.grid_precision_decimals)
    }

    pub fn choose_cluster(&self, report: &RawReport, candidates: &[HazardCluster]) -> Assignment {
        assign::choose_cluster(report, candidates, &self.config)
    }

    pub fn compute_markers(
        &self,
        candidates: &MarkerCandidates,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<UnifiedMarker> {
        markers::compute_markers(candidates, now, limit, &self.config)
    }
}
