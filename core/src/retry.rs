//! Bounded retry with exponential backoff
//!
//! Wraps a fallible async operation with a fixed attempt budget. The delay
//! between attempts starts at the configured value and doubles after each
//! failure, with no upper cap. Delays are only inserted between attempts,
//! never after the final failure.

use crate::error::RequestError;
use std::future::Future;
use std::time::Duration;

/// Run `op` up to the attempt budget, backing off between failures.
///
/// A budget of 0 or 1 means a single attempt. On success, returns the
/// operation's value together with the number of attempts made. When every
/// attempt fails, the last error is wrapped in
/// [`RequestError::RetriesExhausted`] carrying the attempt count. An error
/// the taxonomy marks non-retryable surfaces immediately, unwrapped.
///
/// ## Example
///
/// ```ignore
/// let (response, attempts) = run_with_retry(3, Duration::from_millis(500), || {
///     send_once(&request, timeout_ms)
/// })
/// .await?;
/// ```
///
/// # Errors
///
/// Returns the underlying [`RequestError`] for a non-retryable failure, or
/// [`RequestError::RetriesExhausted`] once the budget is spent.
pub async fn run_with_retry<T, F, Fut>(
    max_retries: u32,
    initial_delay: Duration,
    op: F,
) -> Result<(T, u32), RequestError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let attempts = max_retries.max(1);
    let mut delay = initial_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok((value, attempt)),
            Err(error) if !error.is_retryable() => return Err(error),
            Err(error) => {
                if attempt >= attempts {
                    return Err(RequestError::RetriesExhausted {
                        attempts,
                        last: Box::new(error),
                    });
                }
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    ?delay,
                    error = %error,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(3, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RequestError>("success".to_string())
            }
        })
        .await;

        let (value, attempts) = result.expect("should succeed");
        assert_eq!(value, "success");
        assert_eq!(attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1); // Only one attempt
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(3, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(RequestError::Network("connection refused".to_string()))
                } else {
                    Ok("success".to_string())
                }
            }
        })
        .await;

        let (value, attempts) = result.expect("should succeed");
        assert_eq!(value, "success");
        assert_eq!(attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_attempts_fail_wraps_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(3, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestError::Timeout { timeout_ms: 1000 })
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3); // All three attempts
        let error = result.expect_err("should exhaust retries");
        match &error {
            RequestError::RetriesExhausted { attempts, last } => {
                assert_eq!(*attempts, 3);
                assert!(matches!(**last, RequestError::Timeout { timeout_ms: 1000 }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert!(error.to_string().contains("All 3 attempts failed"));
        assert!(error.to_string().contains("timed out after 1000ms"));
    }

    #[tokio::test]
    async fn test_zero_budget_means_single_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(0, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestError::Network("refused".to_string()))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1); // Only one attempt
        let error = result.expect_err("should fail");
        assert!(error.to_string().contains("All 1 attempts failed"));
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(5, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestError::InvalidUrl("nope".to_string()))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1); // No retry for validation errors
        let error = result.expect_err("should fail");
        assert!(matches!(error, RequestError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_backoff_delays_double_between_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let start = std::time::Instant::now();
        let result = run_with_retry(3, Duration::from_millis(10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestError::Network("flaky".to_string()))
            }
        })
        .await;
        let elapsed = start.elapsed();

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Backoff: 10ms + 20ms = 30ms minimum
        assert!(elapsed >= Duration::from_millis(30));
    }
}
