use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound on parallel workers; the catalog is a single small origin.
pub const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.max_page_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max_page_failures must be >= 1, got {}",
            config.max_page_failures
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // reqwest rejects header values with control characters at build time
    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user agent must not contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.products_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "products_path cannot be empty".to_string(),
        ));
    }

    if config.images_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "images_dir cannot be empty".to_string(),
        ));
    }

    if config.thumbnail_size < 1 {
        return Err(ConfigError::Validation(format!(
            "thumbnail_size must be >= 1, got {}",
            config.thumbnail_size
        )));
    }

    Ok(())
}
