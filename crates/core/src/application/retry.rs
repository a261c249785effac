// Retry Executor
// Bounded retry with randomized, monotonically non-decreasing backoff.
// Jitter desynchronizes callers hammering the same downstream service
// after a shared outage.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::application::cancel::CancelToken;

/// Backoff policy for retried operations
///
/// A stateless value object: reusable across calls, never mutated by
/// in-flight retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySession {
    /// Total invocation budget (first attempt included)
    pub max_attempts: u32,
    /// Initial sleep between attempts
    pub base_delay: Duration,
}

impl RetrySession {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }
}

impl Default for RetrySession {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
        }
    }
}

/// Retry failure
#[derive(Error, Debug)]
pub enum RetryError<E> {
    #[error("After {attempts} attempts, last error: {source}")]
    Exhausted { attempts: u32, source: E },

    #[error("Retry cancelled")]
    Cancelled,
}

/// Invoke `op` until it succeeds or the attempt budget is exhausted
///
/// Between attempts, sleeps the current delay plus a uniform jitter in
/// `[0, delay/2)`, then grows the delay by the jitter amount for the next
/// round. The sleep races against `cancel`, so an aborted aggregate does
/// not keep retrying a dead operation.
///
/// # Errors
/// - `RetryError::Exhausted` after `max_attempts` failures, wrapping the
///   attempt count and the last underlying error
/// - `RetryError::Cancelled` if the token fires during a backoff sleep
pub async fn retry<T, E, F, Fut>(
    session: RetrySession,
    cancel: CancelToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = session.max_attempts.max(1);
    let mut delay = session.base_delay;
    let mut token = cancel;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt == attempts {
                    return Err(RetryError::Exhausted {
                        attempts,
                        source: err,
                    });
                }
                warn!(
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after error"
                );

                let jitter = jitter_of(delay);
                tokio::select! {
                    _ = sleep(delay + jitter) => {}
                    _ = token.cancelled() => return Err(RetryError::Cancelled),
                }
                delay += jitter;
            }
        }
    }
    unreachable!("retry loop returns within the attempt budget")
}

/// Uniform jitter in `[0, delay/2)`
fn jitter_of(delay: Duration) -> Duration {
    let half = (delay.as_millis() as u64 / 2).max(1);
    Duration::from_millis(rand::thread_rng().gen_range(0..half))
}
