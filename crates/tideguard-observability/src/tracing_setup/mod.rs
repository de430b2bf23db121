//! Tracing setup: structured logging with span definitions and event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use tideguard_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "TIDEGUARD_LOG";

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// Respects `TIDEGUARD_LOG` for filtering, falling back to `config.log_level`.
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    let level = config.log_level.clone();
    let json = config.log_json;
    INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true);

        // try_init: an embedding application may already own the global subscriber.
        let _ = if json {
            builder
                .with_file(true)
                .with_line_number(true)
                .json()
                .try_init()
        } else {
            builder.try_init()
        };
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);
    INIT.call_once(move || {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}
