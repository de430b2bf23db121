/// Fusion subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    #[error("cluster {cluster_id} has no member reports to fuse")]
    EmptyCluster { cluster_id: String },

    #[error("cluster {cluster_id} references missing report {report_id}")]
    MissingMember {
        cluster_id: String,
        report_id: String,
    },
}
