use crate::config::types::{CollectConfig, Config, CrawlerConfig, HttpConfig, SourceConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    config.retry.to_policy()?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_collect_config(&config.collect)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates collection configuration
fn validate_collect_config(config: &CollectConfig) -> ConfigResult<()> {
    if let Some(query) = config.queries.iter().find(|q| q.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "queries cannot contain blank entries, got '{}'",
            query
        )));
    }

    if let Some(number) = config
        .requested_chapters
        .iter()
        .find(|n| !n.is_finite() || **n < 0.0)
    {
        return Err(ConfigError::Validation(format!(
            "requested_chapters must be finite and non-negative, got {}",
            number
        )));
    }

    Ok(())
}

/// Validates source entries
fn validate_sources(sources: &[SourceConfig]) -> ConfigResult<()> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "At least one [[source]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in sources {
        validate_source_id(&source.id)?;

        if !seen.insert(source.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate source id '{}'",
                source.id
            )));
        }

        let url = Url::parse(&source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base URL '{}' for source '{}': {}",
                source.base_url, source.id, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Base URL '{}' must use http or https",
                source.base_url
            )));
        }
    }

    Ok(())
}

/// Source ids go into URL paths: alphanumeric, hyphens and underscores only
fn validate_source_id(id: &str) -> ConfigResult<()> {
    if id.is_empty() {
        return Err(ConfigError::Validation(
            "source id cannot be empty".to_string(),
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "source id '{}' must contain only alphanumeric characters, hyphens and underscores",
            id
        )));
    }

    Ok(())
}
