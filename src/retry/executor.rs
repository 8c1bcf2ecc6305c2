//! Backoff executor
//!
//! Runs a fallible async call under a [`RetryPolicy`]:
//!
//! | Failure | Action |
//! |---------|--------|
//! | Terminal (e.g. HTTP 404, malformed request) | Propagate immediately, no delay |
//! | Transient with attempts left | Sleep, grow the delay, call again |
//! | Transient on the last attempt | Propagate as `RetryError::Exhausted` |
//! | Cancellation | Stop before the next call or during a sleep |

use super::policy::{FailureClass, RetryPolicy};
use crate::FetchError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A retry about to happen
#[derive(Debug, Clone, PartialEq)]
pub struct RetryEvent {
    /// The attempt that just failed (1-based)
    pub attempt: u32,

    /// Total attempts allowed by the policy
    pub max_attempts: u32,

    /// How long the executor sleeps before the next attempt
    pub delay: Duration,

    /// Classification of the failure
    pub classification: FailureClass,

    /// The failure that triggered the retry
    pub failure: FetchError,
}

/// Errors returned by the backoff executor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError {
    #[error("terminal failure on attempt {attempts}: {source}")]
    Terminal { attempts: u32, source: FetchError },

    #[error("retries exhausted after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: FetchError },

    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled {
        attempts: u32,
        last_failure: Option<FetchError>,
    },
}

impl RetryError {
    /// Number of calls that were actually made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Terminal { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The last failure the call produced, if any call was made
    pub fn failure(&self) -> Option<&FetchError> {
        match self {
            Self::Terminal { source, .. } | Self::Exhausted { source, .. } => Some(source),
            Self::Cancelled { last_failure, .. } => last_failure.as_ref(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Executes `call` under `policy`
///
/// Each retry is logged as a structured `warn` event. Use
/// [`execute_observed`] to receive the same events programmatically.
///
/// # Example
///
/// ```no_run
/// use chapter_sieve::retry::{execute, RetryPolicy};
/// use chapter_sieve::FetchError;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let policy = RetryPolicy::default();
/// let cancel = CancellationToken::new();
/// let value = execute(&policy, &cancel, || async { Ok::<_, FetchError>(42) }).await;
/// assert_eq!(value, Ok(42));
/// # }
/// ```
pub async fn execute<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    execute_observed(policy, cancel, |_| {}, call).await
}

/// Executes `call` under `policy`, reporting every scheduled retry to `observe`
///
/// `observe` runs before the executor sleeps, so it sees the delay that is
/// about to be applied.
pub async fn execute_observed<T, F, Fut, O>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut observe: O,
    mut call: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
    O: FnMut(&RetryEvent),
{
    let max_attempts = policy.max_attempts();
    let mut delay = policy.initial_delay();
    let mut attempt = 0;
    let mut last_failure = None;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled {
                attempts: attempt,
                last_failure,
            });
        }

        attempt += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(RetryError::Cancelled {
                    attempts: attempt,
                    last_failure,
                });
            }
            outcome = call() => outcome,
        };

        let failure = match outcome {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        let classification = policy.classify(&failure);
        if classification == FailureClass::Terminal {
            tracing::debug!(attempt, failure = %failure, "Terminal failure, not retrying");
            return Err(RetryError::Terminal {
                attempts: attempt,
                source: failure,
            });
        }

        if attempt >= max_attempts {
            tracing::warn!(
                attempt,
                max_attempts,
                failure = %failure,
                "Retries exhausted"
            );
            return Err(RetryError::Exhausted {
                attempts: attempt,
                source: failure,
            });
        }

        let event = RetryEvent {
            attempt,
            max_attempts,
            delay,
            classification,
            failure,
        };
        tracing::warn!(
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            delay_ms = event.delay.as_millis() as u64,
            classification = %event.classification,
            failure = %event.failure,
            "Retrying after transient failure"
        );
        observe(&event);
        last_failure = Some(event.failure);

        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled {
                attempts: attempt,
                last_failure,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(RetryError::Cancelled {
                    attempts: attempt,
                    last_failure,
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }

        delay = policy.next_delay(delay);
    }
}
