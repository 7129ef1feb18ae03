use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, MAX_DELAY_SECS};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if !config.delay_secs.is_finite() || config.delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_secs must be a non-negative number, got {}",
            config.delay_secs
        )));
    }

    if config.delay_secs > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "delay_secs must be at most {}, got {}",
            MAX_DELAY_SECS, config.delay_secs
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents cannot be empty".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(directory) = &config.directory {
        if directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output directory cannot be empty".to_string(),
            ));
        }
    }

    if config.mapping_file.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mapping_file cannot be empty".to_string(),
        ));
    }

    if config.mapping_file.contains('/') || config.mapping_file.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "mapping_file must be a bare file name, got '{}'",
            config.mapping_file
        )));
    }

    Ok(())
}

/// Validates a crawl start URL
///
/// The start URL must be absolute, use HTTP(S) and carry a host.
pub fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start URL has no host: {}",
            start_url
        )));
    }

    Ok(())
}
