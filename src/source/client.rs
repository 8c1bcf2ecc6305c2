//! HTTP client construction and failure mapping

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use chapter_sieve::config::HttpConfig;
/// use chapter_sieve::source::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a `reqwest` error onto the failure taxonomy
///
/// | reqwest error | FetchError |
/// |---------------|------------|
/// | Timeout | `Timeout` |
/// | Connect | `Connect` |
/// | Carries a status | `Status` |
/// | Builder (bad URL, bad header) | `Request` |
/// | Body / decode | `Decode` |
/// | Other send failures (reset, closed) | `Connect` |
pub(crate) fn map_reqwest_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if let Some(status) = err.status() {
        FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }
    } else if err.is_builder() {
        FetchError::Request {
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        FetchError::Connect {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Turns a non-success status into `FetchError::Status`
pub(crate) fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
