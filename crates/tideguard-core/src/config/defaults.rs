// Single source of truth for all default values.

// --- Dedup ---
pub const DEFAULT_GRID_PRECISION_DECIMALS: u32 = 3; // ~111 m per cell
pub const DEFAULT_CLUSTER_PRIORITY: i32 = 10;
pub const DEFAULT_SELF_OVERRIDE_PRIORITY: i32 = 9;
pub const DEFAULT_SELF_REPORT_PRIORITY: i32 = 8;
pub const DEFAULT_REPORT_PRIORITY: i32 = 5;
pub const DEFAULT_SELF_OVERRIDE_WINDOW_SECS: i64 = 1_800; // 30 minutes
pub const DEFAULT_MARKER_CAP: usize = 50;
pub const DEFAULT_JOIN_WINDOW_SECS: i64 = 21_600; // 6 hours

// --- Fusion ---
pub const DEFAULT_BOOST_STEP: f64 = 0.1;
pub const DEFAULT_BOOST_CAP: f64 = 0.4;
pub const DEFAULT_CREDIBILITY_WEIGHT: f64 = 0.2;
pub const DEFAULT_DIVERSITY_STEP: f64 = 0.3;
pub const DEFAULT_DIVERSITY_CAP: f64 = 1.2;
pub const DEFAULT_CONFIDENCE_CEILING: f64 = 0.95;
pub const DEFAULT_SOURCE_WEIGHT_CITIZEN: f64 = 0.6;
pub const DEFAULT_SOURCE_WEIGHT_OFFICIAL: f64 = 0.9;
pub const DEFAULT_SOURCE_WEIGHT_SOCIAL: f64 = 0.4;
pub const DEFAULT_SOURCE_WEIGHT_BEACON: f64 = 0.95;

// --- Lifecycle ---
pub const DEFAULT_REOPEN_DELTA: f64 = 0.1;
pub const DEFAULT_URGENT_SEVERITY: u8 = 4;
pub const DEFAULT_URGENT_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_MAX_NOTES_LEN: usize = 4_000;
pub const DEFAULT_SEVERITY: u8 = 3;

// --- Ingest ---
pub const DEFAULT_UNCLASSIFIED_BASE_CONFIDENCE: f64 = 0.15;
pub const DEFAULT_FALLBACK_CREDIBILITY: f64 = 0.3;
pub const DEFAULT_UNKNOWN_HAZARD_TYPE: &str = "unknown";
pub const DEFAULT_BEACON_OVERRIDE: bool = true;
pub const DEFAULT_BEACON_HAZARD_TYPE: &str = "emergency";
pub const DEFAULT_BEACON_BASE_CONFIDENCE: f64 = 0.99;
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: i64 = 300;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "tideguard.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Engine ---
pub const DEFAULT_SNAPSHOT_REFRESH_MS: u64 = 2_000;
pub const DEFAULT_RECONCILE_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONCILE_INITIAL_BACKOFF_MS: u64 = 100;
pub const DEFAULT_RECONCILE_MAX_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1_024;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_JSON: bool = false;
pub const DEFAULT_ALERT_WINDOW_SECS: i64 = 600;
pub const DEFAULT_ALERT_WARNING_FALLBACKS: usize = 5;
pub const DEFAULT_ALERT_CRITICAL_SECS: i64 = 1_800; // 30 minutes unscored
