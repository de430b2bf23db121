//! Retry with exponential backoff for background work.

use std::time::Duration;

use tideguard_core::config::EngineConfig;
use tideguard_core::errors::TideguardResult;

/// Initial delay doubling up to `max_delay`, for at most `max_attempts` tries.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            initial_delay: config.initial_backoff(),
            max_delay: config.max_backoff(),
            max_attempts: config.reconcile_max_attempts.max(1),
        }
    }

    /// Delay before attempt `attempt` (1-based; the first attempt has none).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let doublings = (attempt - 2).min(31);
        self.initial_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts run out. `on_retry` is called before each retry.
    pub fn retry<T, F, R>(&self, label: &str, mut op: F, mut on_retry: R) -> TideguardResult<T>
    where
        F: FnMut() -> TideguardResult<T>,
        R: FnMut(u32),
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    attempt += 1;
                    let delay = self.delay_before(attempt);
                    tracing::debug!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        ?delay,
                        error = %e,
                        "retrying after transient failure"
                    );
                    on_retry(attempt);
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tideguard_core::errors::{StorageError, TideguardError};

    fn policy() -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            max_attempts: 4,
        }
    }

    #[test]
    fn delays_double_up_to_the_ceiling() {
        let p = policy();
        assert_eq!(p.delay_before(1), Duration::ZERO);
        assert_eq!(p.delay_before(2), Duration::from_millis(100));
        assert_eq!(p.delay_before(3), Duration::from_millis(200));
        assert_eq!(p.delay_before(4), Duration::from_millis(400));
        assert_eq!(p.delay_before(20), Duration::from_secs(5));
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let p = BackoffPolicy {
            initial_delay: Duration::from_millis(1),
            ..policy()
        };
        let mut calls = 0;
        let mut retries = 0;
        let result = p.retry(
            "test",
            || {
                calls += 1;
                if calls < 3 {
                    Err(TideguardError::StorageError(StorageError::LockPoisoned))
                } else {
                    Ok(calls)
                }
            },
            |_| retries += 1,
        );
        assert_eq!(result.unwrap(), 3);
        assert_eq!(retries, 2);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: TideguardResult<()> = policy().retry(
            "test",
            || {
                calls += 1;
                Err(TideguardError::validation("bad"))
            },
            |_| {},
        );
        assert!(result.unwrap_err().is_validation());
        assert_eq!(calls, 1);
    }

    #[test]
    fn attempts_are_bounded() {
        let p = BackoffPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_attempts: 3,
        };
        let mut calls = 0;
        let result: TideguardResult<()> = p.retry(
            "test",
            || {
                calls += 1;
                Err(TideguardError::ConcurrencyError("busy".into()))
            },
            |_| {},
        );
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
