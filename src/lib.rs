//! Larodan scraper: a polite catalog harvester
//!
//! This crate walks the paginated listing of one product category, visits every
//! product page concurrently, extracts chemical product metadata, stores a
//! thumbnail of each structure image and writes the collection as JSON.

pub mod config;
pub mod crawler;
pub mod output;
pub mod product;

use thiserror::Error;

/// Main error type for scraper operations
///
/// Per-page and per-image failures never surface here; they are logged and
/// recorded as skipped work. Only startup and dataset writing can fail a run.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unsupported listing URL {url}: {reason}")]
    InvalidListingUrl { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlReport};
pub use product::{Product, ProductOutcome};
