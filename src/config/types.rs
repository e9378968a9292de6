use serde::Deserialize;
use std::path::PathBuf;

/// Browser identity sent with every request; the catalog rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for the scraper
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of product pages processed in parallel
    pub concurrency: usize,

    /// Delay between two listing page requests (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Consecutive listing page failures that end discovery
    #[serde(rename = "max-page-failures")]
    pub max_page_failures: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            page_delay_ms: 1000,
            max_page_failures: 1,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON dataset
    #[serde(rename = "products-path")]
    pub products_path: PathBuf,

    /// Directory receiving structure thumbnails
    #[serde(rename = "images-dir")]
    pub images_dir: PathBuf,

    /// Upper bound for both thumbnail dimensions (pixels)
    #[serde(rename = "thumbnail-size")]
    pub thumbnail_size: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            products_path: PathBuf::from("products.json"),
            images_dir: PathBuf::from("images"),
            thumbnail_size: 100,
        }
    }
}
