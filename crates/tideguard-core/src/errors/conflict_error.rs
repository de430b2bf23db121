/// Conflicts raised by the review workflow. Surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// The cluster already reached `approved` or `rejected`.
    #[error("cluster {cluster_id} is already {status}")]
    TerminalStatus { cluster_id: String, status: String },

    /// Another writer committed a change to the cluster first.
    #[error("cluster {cluster_id} was modified concurrently (expected version {expected_version})")]
    LostRace {
        cluster_id: String,
        expected_version: u64,
    },

    /// The report is already a member of a cluster.
    #[error("report {report_id} already belongs to cluster {cluster_id}")]
    AlreadyAttached {
        report_id: String,
        cluster_id: String,
    },
}
