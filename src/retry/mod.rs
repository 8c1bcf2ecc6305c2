//! Retry module for transient network failures
//!
//! This module wraps a single network call with an exponential backoff
//! policy. It holds no state across calls, so any number of executions may
//! run concurrently.
//!
//! # Components
//!
//! - `RetryPolicy`: Attempt budget, delay growth and failure classification
//! - `execute` / `execute_observed`: The backoff executor itself
//! - `RetryEvent`: Structured description of one scheduled retry

mod executor;
mod policy;

pub use executor::{execute, execute_observed, RetryError, RetryEvent};
pub use policy::{
    default_classifier, rate_limit_classifier, Classifier, FailureClass, FailureKind, RetryPolicy,
};
