//! Integration tests against mock gateway servers
//!
//! These tests use wiremock to stand in for source gateways and exercise
//! the adapters, the backoff executor and the collector end-to-end.

mod collector_tests;
mod source_tests;

use chapter_sieve::config::{ChapterListing, HttpConfig, SourceConfig};
use chapter_sieve::retry::RetryPolicy;
use chapter_sieve::source::{build_http_client, HttpSource};
use std::time::Duration;

/// Creates an adapter for `source_id` pointing at a mock server
pub fn test_source(base_url: &str, source_id: &str, chapter_listing: ChapterListing) -> HttpSource {
    let config = SourceConfig {
        id: source_id.to_string(),
        base_url: base_url.to_string(),
        chapter_listing,
    };
    let client = build_http_client(&HttpConfig::default()).expect("client");
    HttpSource::new(client, &config).expect("source")
}

/// Three attempts with millisecond delays, so retries don't slow the suite down
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5), 2.0).expect("policy")
}
