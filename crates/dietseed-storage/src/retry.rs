//! Bounded retry with a fixed delay between attempts.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::duration_secs;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Every attempt failed or was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: String,
}

impl std::fmt::Display for RetryExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl std::error::Error for RetryExhausted {}

/// Run `op` until it returns `Ok` with a value `accept` agrees with, or the
/// policy runs out of attempts.
///
/// `op` receives the 1-based attempt number. The delay is spent only between
/// attempts, never after the last one.
pub async fn retry_until<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    accept: P,
) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&T) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(value) if accept(&value) => {
                tracing::debug!(label, attempt, "attempt succeeded");
                return Ok(value);
            }
            Ok(_) => {
                last_error = "result rejected".to_string();
            }
            Err(err) => {
                last_error = err.to_string();
            }
        }

        tracing::warn!(
            label,
            attempt,
            max_attempts,
            error = %last_error,
            "attempt {attempt}/{max_attempts}: {label} not ready yet"
        );

        if attempt < max_attempts && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }

    tracing::error!(label, max_attempts, "giving up on {label}");
    Err(RetryExhausted {
        attempts: max_attempts,
        last_error,
    })
}

/// [`retry_until`] accepting any `Ok` value.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_until(policy, label, op, |_| true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry(&instant(5), "flaky", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(format!("refused on {attempt}"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_with_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(&instant(4), "down", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(format!("refused on {attempt}")) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error, "refused on 4");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_predicate_rejects_wrong_value() {
        let result = retry_until(
            &instant(3),
            "liveness",
            |attempt| async move { Ok::<_, String>(if attempt == 2 { 1 } else { 0 }) },
            |num| *num == 1,
        )
        .await;
        assert_eq!(result, Ok(1));

        let never = retry_until(
            &instant(2),
            "liveness",
            |_| async { Ok::<i64, String>(0) },
            |num| *num == 1,
        )
        .await;
        assert_eq!(never.unwrap_err().last_error, "result rejected");
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        let _ = retry(&instant(0), "once", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("nope") }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
