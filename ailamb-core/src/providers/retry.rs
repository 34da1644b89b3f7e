//! Retry policy for completion requests
//!
//! A single configurable retry with exponential backoff is applied to
//! transient failures (rate limits, network errors) before the typed error
//! is surfaced to the caller.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use super::traits::CompletionError;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try
    pub max_retries: usize,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Build an exponential backoff strategy from configuration
pub fn build_backoff(config: &RetryConfig) -> ExponentialBuilder {
    let mut builder = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_max_times(config.max_retries);

    if config.jitter {
        builder = builder.with_jitter();
    }

    builder
}

/// Run a completion request under the retry policy. Only retriable kinds
/// (rate limits, network failures) are retried; authentication and decode
/// failures surface immediately.
pub async fn retry_completion<F, Fut>(
    config: &RetryConfig,
    operation: F,
) -> std::result::Result<String, CompletionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<String, CompletionError>>,
{
    operation
        .retry(build_backoff(config))
        .when(CompletionError::is_retriable)
        .notify(|err: &CompletionError, delay: Duration| {
            tracing::warn!(kind = err.kind(), ?delay, "retrying completion request");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tight delays keep the backoff tests fast
    fn fast_config(max_retries: usize) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_transient_failure_attempted_max_retries_plus_one() {
        let attempts = AtomicUsize::new(0);
        let result = retry_completion(&fast_config(2), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(CompletionError::RateLimited("HTTP 429".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(CompletionError::RateLimited(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_attempted_once() {
        let attempts = AtomicUsize::new(0);
        let result = retry_completion(&fast_config(2), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(CompletionError::AuthenticationFailed("HTTP 401".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(CompletionError::AuthenticationFailed(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovery_after_transient_failure() {
        let attempts = AtomicUsize::new(0);
        let result = retry_completion(&fast_config(3), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(CompletionError::NetworkFailure("reset".to_string()))
                } else {
                    Ok("recovered".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_attempted_once() {
        let attempts = AtomicUsize::new(0);
        let result = retry_completion(&fast_config(0), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(CompletionError::NetworkFailure("down".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(10));
        assert!(config.jitter);
    }

    #[test]
    fn test_with_max_retries() {
        let config = RetryConfig::default().with_max_retries(3);
        assert_eq!(config.max_retries, 3);
    }
}
