//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the shared client with a browser-like user agent
//! - GET requests for listing and product pages
//! - GET requests for raw image bytes
//! - Error classification
//!
//! Nothing here retries. A failed request is reported once and the caller
//! decides whether that ends discovery or only skips one unit of work.

use crate::config::UserAgentConfig;
use crate::product::SkipReason;
use reqwest::{Client, Response};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<T> {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Response body
        body: T,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl<T> FetchResult<T> {
    /// Returns the body, or the reason the resource is unusable
    pub fn into_body(self) -> Result<T, SkipReason> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::HttpError { status_code } => Err(SkipReason::HttpStatus(status_code)),
            Self::NetworkError { error } => Err(SkipReason::Network(error)),
        }
    }
}

/// Builds the HTTP client shared by every fetcher
///
/// `reqwest::Client` pools connections internally and is cheap to clone, so
/// the coordinator hands clones of this one client to all workers.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout
///
/// # Example
///
/// ```no_run
/// use larodan_scraper::config::UserAgentConfig;
/// use larodan_scraper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body as text
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult<String> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches a resource and returns its raw bytes
pub async fn fetch_bytes(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let final_url = response.url().to_string();
    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Sends a GET request and classifies everything except a success status
async fn send<T>(client: &Client, url: &str) -> Result<Response, FetchResult<T>> {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                Err(FetchResult::HttpError {
                    status_code: status.as_u16(),
                })
            }
        }
        Err(e) => Err(FetchResult::NetworkError {
            error: classify_error(&e),
        }),
    }
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
