//! Uniform bounded retry-with-backoff for whole operation attempts
//!
//! One policy applied by every service call site: exponential backoff with
//! jitter, a small fixed attempt ceiling, and retries only for errors that
//! classify as retryable. The extraction poller keeps its own
//! fixed-interval schedule and is not wrapped by this.

use std::future::Future;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::RetryConfig;
use crate::error::AgentError;

/// Run `action`, retrying up to `config.max_retries` additional times on
/// retryable errors
pub async fn with_retry<T, A, F>(
    config: &RetryConfig,
    label: &str,
    action: A,
) -> Result<T, AgentError>
where
    A: FnMut() -> F,
    F: Future<Output = Result<T, AgentError>>,
{
    let strategy = ExponentialBackoff::from_millis(config.base_delay_ms)
        .map(jitter)
        .take(config.max_retries as usize);

    let label = label.to_string();
    RetryIf::spawn(strategy, action, |err: &AgentError| {
        let retry = err.is_retryable();
        if retry {
            tracing::warn!(
                label = %label,
                category = err.category(),
                error = %err,
                "Operation attempt failed, retrying"
            );
        }
        retry
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&config(2), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AgentError::Gateway("flaky".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_validation_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&config(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AgentError::validation("bad input")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_does_not_retry_duplicate_submission() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&config(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AgentError::DuplicateTransaction {
                    transaction_id: "txid_abc".to_string(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_ceiling_is_respected() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&config(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AgentError::Submission("down".to_string())) }
        })
        .await;
        assert!(result.is_err());
        // Initial attempt plus two retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
