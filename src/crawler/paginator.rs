//! Listing pagination
//!
//! This module walks a category listing one page at a time:
//! - Page URLs are `<base>/page/<n>/`, starting at 1
//! - Pages are fetched strictly in sequence with a fixed delay in between
//! - An empty page ends the walk (past the last page)
//! - A failed fetch ends the walk once `max_page_failures` consecutive
//!   pages have failed
//!
//! The walk is finite and cannot be restarted: once it has ended, every
//! further call returns `None`.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::extract_product_links;
use crate::crawler::fetcher::fetch_url;
use crate::output::CrawlObserver;
use crate::product::SkipReason;
use crate::ScraperError;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Why discovery stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationEnd {
    /// A listing page had no product links
    Exhausted {
        /// Number of the empty page
        page: u32,
    },

    /// Too many consecutive listing pages could not be fetched
    FetchFailed {
        /// Number of the last failed page
        page: u32,
        /// Failure of that page
        reason: SkipReason,
    },
}

impl fmt::Display for PaginationEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { page } => write!(f, "page {} lists no products", page),
            Self::FetchFailed { page, reason } => {
                write!(f, "failed to fetch page {} ({})", page, reason)
            }
        }
    }
}

/// Normalizes a category listing URL so page paths can be appended
///
/// The URL must be absolute HTTP(S). A missing trailing slash is added;
/// query and fragment are dropped.
///
/// # Example
///
/// ```
/// use larodan_scraper::crawler::normalize_listing_url;
///
/// let base = normalize_listing_url("https://example.com/product-category/fatty-acids").unwrap();
/// assert_eq!(base.as_str(), "https://example.com/product-category/fatty-acids/");
/// ```
pub fn normalize_listing_url(raw: &str) -> Result<Url, ScraperError> {
    let mut url = Url::parse(raw.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidListingUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Builds the URL of listing page `page` under a normalized base URL
pub fn page_url(base_url: &Url, page: u32) -> Result<Url, ScraperError> {
    Ok(base_url.join(&format!("page/{}/", page))?)
}

/// Sequential walker over the listing pages of one category
pub struct Paginator {
    client: Client,
    base_url: Url,
    delay: Duration,
    max_page_failures: u32,
    observer: Arc<dyn CrawlObserver>,
    next_page: u32,
    pages_requested: u32,
    consecutive_failures: u32,
    end: Option<PaginationEnd>,
}

impl Paginator {
    /// Creates a walker starting at page 1
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `base_url` - Normalized listing URL (see `normalize_listing_url`)
    /// * `config` - Delay and failure tolerance
    /// * `observer` - Receives page events
    pub fn new(
        client: Client,
        base_url: Url,
        config: &CrawlerConfig,
        observer: Arc<dyn CrawlObserver>,
    ) -> Self {
        Self {
            client,
            base_url,
            delay: Duration::from_millis(config.page_delay_ms),
            max_page_failures: config.max_page_failures.max(1),
            observer,
            next_page: 1,
            pages_requested: 0,
            consecutive_failures: 0,
            end: None,
        }
    }

    /// Fetches the next listing page and returns its product URLs
    ///
    /// Returns `None` once the listing is exhausted or discovery failed, and
    /// on every call after that. A tolerated page failure is skipped
    /// transparently, so a returned batch is never empty.
    pub async fn next_page(&mut self) -> Option<Vec<Url>> {
        loop {
            if self.end.is_some() {
                return None;
            }

            let page = self.next_page;
            self.next_page += 1;

            let url = match page_url(&self.base_url, page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Cannot build URL for page {}: {}", page, e);
                    self.finish(PaginationEnd::Exhausted { page });
                    return None;
                }
            };

            if self.pages_requested > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.pages_requested += 1;

            let body = match fetch_url(&self.client, url.as_str()).await.into_body() {
                Ok(body) => body,
                Err(reason) => {
                    self.observer.listing_page_failed(page, url.as_str(), &reason);
                    self.consecutive_failures += 1;
                    if self.consecutive_failures >= self.max_page_failures {
                        self.finish(PaginationEnd::FetchFailed { page, reason });
                        return None;
                    }
                    continue;
                }
            };
            self.consecutive_failures = 0;

            let links: Vec<Url> = extract_product_links(&body, &url)
                .iter()
                .filter_map(|link| Url::parse(link).ok())
                .collect();
            self.observer
                .listing_page_fetched(page, url.as_str(), links.len());

            if links.is_empty() {
                self.finish(PaginationEnd::Exhausted { page });
                return None;
            }

            return Some(links);
        }
    }

    /// Walks every remaining page and returns all product URLs in order
    pub async fn discover(&mut self) -> Vec<Url> {
        let mut urls = Vec::new();
        while let Some(batch) = self.next_page().await {
            urls.extend(batch);
        }
        urls
    }

    /// Why the walk ended, once it has
    pub fn end(&self) -> Option<&PaginationEnd> {
        self.end.as_ref()
    }

    /// Listing pages requested so far
    pub fn pages_requested(&self) -> u32 {
        self.pages_requested
    }

    fn finish(&mut self, end: PaginationEnd) {
        tracing::debug!("Pagination ended: {}", end);
        self.end = Some(end);
    }
}
