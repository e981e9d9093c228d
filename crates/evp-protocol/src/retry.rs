//! Timeout and retry wrappers for store and ledger calls.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryPolicy;

/// Run `f` under `timeout`, mapping expiry through `on_timeout`.
pub(crate) async fn bounded<T, E, Fut>(
    timeout: Duration,
    fut: Fut,
    on_timeout: impl FnOnce() -> E,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// Call `f` until it succeeds, fails with a non-transient error, or the
/// policy's retries are exhausted.
pub(crate) async fn retrying<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    is_transient: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for attempt in 0..policy.max_retries {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "transient failure, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn exhausts_all_attempts_on_transient_failure() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = retrying(&fast(), "test", |_| true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = retrying(&fast(), "test", |_| false, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("bad input".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result: Result<u32, String> = retrying(&fast(), "test", |_| true, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err("flaky".to_string())
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn bounded_maps_expiry() {
        let result: Result<(), &str> = bounded(
            Duration::from_millis(5),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            || "timed out",
        )
        .await;
        assert_eq!(result.unwrap_err(), "timed out");
    }
}
