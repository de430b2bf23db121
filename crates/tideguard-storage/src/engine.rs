//! StorageEngine: owns the connection pool, runs migrations at startup, and
//! implements [`IHazardStorage`].

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::instrument;

use tideguard_core::config::StorageConfig;
use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{
    ClusterId, ClusterStatus, GridCell, HazardCluster, HazardEvent, RawReport, ReportId,
    ValidationDecision,
};
use tideguard_core::traits::IHazardStorage;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{cluster_ops, decision_ops, event_ops, report_ops};

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open the database at `config.db_path`, creating it if needed.
    pub fn open(config: &StorageConfig) -> TideguardResult<Self> {
        Self::open_path(Path::new(&config.db_path), config)
    }

    pub fn open_path(path: &Path, config: &StorageConfig) -> TideguardResult<Self> {
        let pool = ConnectionPool::open(path, config, initialize)?;
        tracing::info!(path = %path.display(), "storage opened");
        Ok(Self { pool })
    }

    /// Open an in-memory database. All reads go through the writer.
    pub fn open_in_memory() -> TideguardResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default(), initialize)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> TideguardResult<u32> {
        self.pool.writer.with_conn_sync(migrations::current_version)
    }

    /// File-backed: read pool. In-memory: the writer.
    fn with_reader<F, T>(&self, f: F) -> TideguardResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> TideguardResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn_sync(f),
        }
    }
}

/// Run migrations on the writer before the engine serves anything.
fn initialize(conn: &rusqlite::Connection) -> TideguardResult<()> {
    migrations::run_migrations(conn)?;
    Ok(())
}

impl IHazardStorage for StorageEngine {
    // --- Reports ---

    #[instrument(level = "debug", skip_all, fields(report_id = %report.id))]
    fn insert_report(&self, report: &RawReport) -> TideguardResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| report_ops::insert_report(conn, report))
    }

    fn get_report(&self, id: &ReportId) -> TideguardResult<Option<RawReport>> {
        self.with_reader(|conn| report_ops::get_report(conn, id))
    }

    fn get_reports(&self, ids: &[ReportId]) -> TideguardResult<Vec<RawReport>> {
        self.with_reader(|conn| report_ops::get_reports(conn, ids))
    }

    fn unattached_reports(&self) -> TideguardResult<Vec<RawReport>> {
        self.with_reader(report_ops::unattached_reports)
    }

    fn self_submitted_since(&self, since: DateTime<Utc>) -> TideguardResult<Vec<RawReport>> {
        self.with_reader(|conn| report_ops::self_submitted_since(conn, since))
    }

    fn cluster_of_report(&self, id: &ReportId) -> TideguardResult<Option<ClusterId>> {
        self.with_reader(|conn| report_ops::cluster_of_report(conn, id))
    }

    // --- Clusters ---

    #[instrument(level = "debug", skip_all, fields(cluster_id = %cluster.id))]
    fn create_cluster(&self, cluster: &HazardCluster) -> TideguardResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| cluster_ops::insert_cluster(conn, cluster))
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(cluster_id = %cluster.id, expected_version = expected_version)
    )]
    fn commit_cluster(&self, cluster: &HazardCluster, expected_version: u64) -> TideguardResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| cluster_ops::commit_cluster(conn, cluster, expected_version))
    }

    fn get_cluster(&self, id: &ClusterId) -> TideguardResult<Option<HazardCluster>> {
        self.with_reader(|conn| cluster_ops::get_cluster(conn, id))
    }

    fn clusters_in_cell(&self, cell: &GridCell) -> TideguardResult<Vec<HazardCluster>> {
        self.with_reader(|conn| cluster_ops::clusters_in_cell(conn, cell))
    }

    fn list_clusters(&self, status: Option<ClusterStatus>) -> TideguardResult<Vec<HazardCluster>> {
        self.with_reader(|conn| cluster_ops::list_clusters(conn, status))
    }

    fn cluster_members(&self, id: &ClusterId) -> TideguardResult<Vec<RawReport>> {
        self.with_reader(|conn| cluster_ops::cluster_members(conn, id))
    }

    // --- Decisions ---

    #[instrument(
        level = "debug",
        skip_all,
        fields(cluster_id = %cluster.id, action = %decision.action, expected_version = expected_version)
    )]
    fn commit_decision(
        &self,
        cluster: &HazardCluster,
        expected_version: u64,
        decision: &ValidationDecision,
    ) -> TideguardResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            decision_ops::commit_decision(conn, cluster, expected_version, decision)
        })
    }

    fn decisions_for(&self, id: &ClusterId) -> TideguardResult<Vec<ValidationDecision>> {
        self.with_reader(|conn| decision_ops::decisions_for(conn, id))
    }

    // --- Events ---

    fn append_event(&self, event: &HazardEvent) -> TideguardResult<u64> {
        self.pool
            .writer
            .with_conn_sync(|conn| event_ops::append_event(conn, event))
    }

    fn events_since(&self, after_sequence: u64, limit: usize) -> TideguardResult<Vec<HazardEvent>> {
        self.with_reader(|conn| event_ops::events_since(conn, after_sequence, limit))
    }
}
