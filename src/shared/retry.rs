//! Retry with exponential backoff
//!
//! Used around storage transactions that can fail transiently when several
//! writers contend for the database (SQLite `SQLITE_BUSY`, pool exhaustion).

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use super::errors::{DomainError, DomainResult};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after every further failure.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or the attempt
/// budget is spent. Only errors for which [`DomainError::is_transient`]
/// holds are retried.
pub async fn retry_transient<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> DomainResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        let err: DomainError = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= config.max_attempts || !err.is_transient() {
            return Err(err);
        }

        warn!(
            operation = operation_name,
            attempt,
            max_attempts = config.max_attempts,
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "Transient storage failure, retrying"
        );

        tokio::time::sleep(delay).await;
        delay = delay.saturating_mul(2).min(config.max_delay);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn busy() -> DomainError {
        DomainError::Storage {
            message: "database is locked".into(),
            transient: true,
        }
    }

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&fast(3), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(busy())
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let result: DomainResult<()> = retry_transient(&fast(5), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Validation("bad".into()))
        })
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: DomainResult<()> = retry_transient(&fast(2), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(busy())
        })
        .await;

        assert!(result.unwrap_err().is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
