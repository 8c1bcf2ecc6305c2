use crate::retry::{rate_limit_classifier, RetryPolicy};
use crate::ConfigResult;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Chapter-Sieve
///
/// Every section except `[[source]]` may be omitted and falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub collect: CollectConfig,

    #[serde(rename = "source", default)]
    pub sources: Vec<SourceConfig>,
}

/// Which failures the backoff executor retries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryOn {
    /// HTTP 429/500/502/503/504, timeouts and connection errors
    #[default]
    Transient,

    /// HTTP 429 only
    RateLimit,
}

/// Backoff policy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after each retry
    #[serde(rename = "backoff-multiplier")]
    pub backoff_multiplier: f64,

    #[serde(rename = "retry-on")]
    pub retry_on: RetryOn,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 2000,
            backoff_multiplier: 2.0,
            retry_on: RetryOn::Transient,
        }
    }
}

impl RetryConfig {
    /// Builds the backoff policy described by this section
    pub fn to_policy(&self) -> ConfigResult<RetryPolicy> {
        let policy = RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            self.backoff_multiplier,
        )?;

        Ok(match self.retry_on {
            RetryOn::Transient => policy,
            RetryOn::RateLimit => policy.with_classifier(rate_limit_classifier),
        })
    }
}

/// Pagination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Entities per search page
    #[serde(rename = "page-size")]
    pub page_size: usize,

    /// Maximum number of entities to collect per crawl
    #[serde(rename = "target-count")]
    pub target_count: usize,

    /// Delay between successful page fetches (milliseconds)
    #[serde(rename = "pacing-delay-ms")]
    pub pacing_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            target_count: 1000,
            pacing_delay_ms: 500,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("chapter-sieve/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON report file
    #[serde(rename = "report-path")]
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: "chapter_report.json".to_string(),
        }
    }
}

/// Per-query collection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Titles to search for
    pub queries: Vec<String>,

    /// Number of chapters kept as samples per entity
    #[serde(rename = "chapters-per-entity")]
    pub chapters_per_entity: usize,

    /// Chapter numbers to look up in every chapter list
    #[serde(rename = "requested-chapters")]
    pub requested_chapters: Vec<f64>,

    /// Delay between consecutive queries against one source (milliseconds)
    #[serde(rename = "entity-delay-ms")]
    pub entity_delay_ms: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            chapters_per_entity: 3,
            requested_chapters: vec![1.0, 2.0, 3.0],
            entity_delay_ms: 500,
        }
    }
}

/// How a source encodes its chapter listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterListing {
    /// JSON records, bare or in a `{ "success": true, "data": [...] }` envelope
    #[default]
    Json,

    /// An HTML fragment of `li.wp-manga-chapter > a` anchors
    Html,
}

/// A content source behind a gateway API
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source identifier used in API paths
    pub id: String,

    /// Base URL of the gateway (e.g., "http://localhost:3000")
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "chapter-listing", default)]
    pub chapter_listing: ChapterListing,
}
