//! Retry policy definitions
//!
//! A policy is immutable for the duration of one call. It decides how many
//! attempts a call gets, how long to wait between them, and which failures
//! are worth waiting for at all.

use crate::{ConfigError, ConfigResult, FetchError};
use std::fmt;
use std::time::Duration;

/// Coarse kind of a failed network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The server answered with a non-success HTTP status
    Status(u16),

    /// The request did not complete in time
    Timeout,

    /// The connection could not be established or was reset
    Connection,

    /// The response body could not be decoded
    Decode,

    /// The request itself was malformed
    Request,
}

/// Outcome of classifying a failure against a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Worth retrying after a delay
    Transient,

    /// Propagated immediately, never retried
    Terminal,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

/// Decides whether a failure kind is retryable
pub type Classifier = fn(FailureKind) -> bool;

/// Retries rate limiting, gateway/server errors, timeouts and connection errors
///
/// # Examples
///
/// ```
/// use chapter_sieve::retry::{default_classifier, FailureKind};
///
/// assert!(default_classifier(FailureKind::Status(429)));
/// assert!(default_classifier(FailureKind::Status(503)));
/// assert!(default_classifier(FailureKind::Timeout));
/// assert!(!default_classifier(FailureKind::Status(404)));
/// assert!(!default_classifier(FailureKind::Decode));
/// ```
pub fn default_classifier(kind: FailureKind) -> bool {
    matches!(
        kind,
        FailureKind::Status(429 | 500 | 502 | 503 | 504)
            | FailureKind::Timeout
            | FailureKind::Connection
    )
}

/// Retries HTTP 429 only; everything else is terminal
pub fn rate_limit_classifier(kind: FailureKind) -> bool {
    matches!(kind, FailureKind::Status(429))
}

/// Exponential backoff policy for a single call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    classifier: Classifier,
}

impl RetryPolicy {
    /// Creates a policy using the default classifier
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Total number of call attempts, at least 1
    /// * `initial_delay` - Delay before the first retry, greater than zero
    /// * `backoff_multiplier` - Factor applied to the delay after every retry, at least 1
    ///
    /// # Returns
    ///
    /// * `Ok(RetryPolicy)` - A valid policy
    /// * `Err(ConfigError)` - One of the bounds was violated
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
    ) -> ConfigResult<Self> {
        if max_attempts < 1 {
            return Err(ConfigError::Validation(format!(
                "max_attempts must be >= 1, got {}",
                max_attempts
            )));
        }

        if initial_delay.is_zero() {
            return Err(ConfigError::Validation(
                "initial_delay must be greater than zero".to_string(),
            ));
        }

        if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation(format!(
                "backoff_multiplier must be a finite number >= 1, got {}",
                backoff_multiplier
            )));
        }

        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
            classifier: default_classifier,
        })
    }

    /// Replaces the classifier used to separate transient from terminal failures
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Classifies a failure under this policy
    pub fn classify(&self, failure: &FetchError) -> FailureClass {
        if (self.classifier)(failure.kind()) {
            FailureClass::Transient
        } else {
            FailureClass::Terminal
        }
    }

    /// Returns the delay that follows `current` in the backoff series
    ///
    /// Scaling happens on whole nanoseconds so integral multipliers grow the
    /// delay exactly; the result saturates instead of overflowing.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let nanos = current.as_nanos() as f64 * self.backoff_multiplier;
        if nanos >= u64::MAX as f64 {
            Duration::from_nanos(u64::MAX)
        } else {
            Duration::from_nanos(nanos.round() as u64)
        }
    }

    /// Returns every delay a call can sleep through before it exhausts its attempts
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.max_attempts.saturating_sub(1) as usize);
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            classifier: default_classifier,
        }
    }
}
