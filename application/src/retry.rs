//! Retry executor driven by a [`BackoffPolicy`].
//!
//! Runs a fallible async operation until it succeeds or the policy's attempt
//! budget is spent. Sleeps happen only between attempts, never after the last.

use duet_domain::BackoffPolicy;
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Final failure of an operation whose attempts ran out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Attempts actually made
    pub attempts: u32,
    pub last_error: E,
}

/// Run `op` under `policy`.
///
/// `op` receives the 0-indexed attempt number. `label` identifies the call in
/// log output.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}/{}", label, attempt + 1, max_attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                attempt += 1;
                warn!("{} failed (attempt {}/{}): {}", label, attempt, max_attempts, e);

                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }

                let delay = policy.jittered_delay(attempt - 1, &mut rand::thread_rng());
                if !delay.is_zero() {
                    debug!("{} retrying in {:?}", label, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let policy = BackoffPolicy::immediate(4);
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(&policy, "flaky", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(format!("fail {}", attempt))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhausts_budget_and_keeps_last_error() {
        let policy = BackoffPolicy::immediate(5);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(&policy, "down", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("refused {}", attempt)) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 5);
        assert_eq!(err.last_error, "refused 4");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_zero_attempt_policy_still_tries_once() {
        let policy = BackoffPolicy::immediate(0);
        let result: Result<(), _> =
            retry_with_backoff(&policy, "once", |_| async { Err("nope") }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_attempts_only() {
        let policy = BackoffPolicy::new(3, std::time::Duration::from_secs(1));
        let started = tokio::time::Instant::now();

        let result: Result<(), _> =
            retry_with_backoff(&policy, "slow", |_| async { Err("nope") }).await;

        assert!(result.is_err());
        // 1s after the first failure, 2s after the second, none after the last
        assert_eq!(started.elapsed(), std::time::Duration::from_secs(3));
    }
}
