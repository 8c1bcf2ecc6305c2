//! Chapter-Sieve: resilient chapter collection for manga sources
//!
//! This crate walks the paged search endpoints of third-party content sources,
//! retrying transient failures with exponential backoff, and turns the
//! free-text chapter titles those sources return into comparable chapter
//! numbers.

pub mod chapters;
pub mod collector;
pub mod config;
pub mod crawler;
pub mod output;
pub mod retry;
pub mod source;

use thiserror::Error;

/// Main error type for Chapter-Sieve operations
///
/// Per-call network failures are reported as [`FetchError`] and wrapped by
/// the retry executor; this type covers setting up the HTTP side of a run.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure of a single network call against a source
///
/// Whether a failure is worth retrying is decided by
/// [`retry::RetryPolicy::classify`], not by the failure itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Invalid response body from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Malformed request: {message}")]
    Request { message: String },
}

impl FetchError {
    /// Returns the coarse kind of this failure, used for retry classification
    pub fn kind(&self) -> retry::FailureKind {
        match self {
            Self::Status { status, .. } => retry::FailureKind::Status(*status),
            Self::Timeout { .. } => retry::FailureKind::Timeout,
            Self::Connect { .. } => retry::FailureKind::Connection,
            Self::Decode { .. } => retry::FailureKind::Decode,
            Self::Request { .. } => retry::FailureKind::Request,
        }
    }

    /// Returns the HTTP status code, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Chapter-Sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use chapters::{find_chapter_by_number, parse_chapter_number, ChapterEntry, Resolution};
pub use config::Config;
pub use crawler::{crawl, CrawlOptions, CrawlOutcome, Entity};
pub use retry::{execute, RetryPolicy};
