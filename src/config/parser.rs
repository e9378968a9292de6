//! Reading the TOML configuration file

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the configuration file at `path`
///
/// Missing sections and keys fall back to their defaults, so an empty file
/// is a valid configuration.
///
/// # Returns
///
/// * `Ok(Config)` - Validated configuration
/// * `Err(ConfigError)` - The file is unreadable, malformed or out of range
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use larodan_scraper::config::load_config;
///
/// let config = load_config(Path::new("scraper.toml")).unwrap();
/// println!("Workers: {}", config.crawler.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration together with the SHA-256 of the exact text parsed
///
/// The hash is lowercase hex and is logged at startup so two runs can be told
/// apart by their settings.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, digest_hex(&content)))
}

fn digest_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
