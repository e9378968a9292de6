//! Observer trait for crawl events
//!
//! The crawler reports progress and per-unit failures through this interface
//! instead of printing. The binary plugs in a logging and progress-bar
//! implementation; tests plug in a recorder.

use crate::crawler::{ImageError, PaginationEnd};
use crate::output::stats::CrawlStats;
use crate::product::{ProductOutcome, SkipReason};

/// Receiver for crawl events
///
/// Implementations must be thread-safe: product events arrive from every
/// worker concurrently. Observers only watch; nothing they do changes the
/// crawl. Every method defaults to doing nothing.
pub trait CrawlObserver: Send + Sync {
    /// A listing page was fetched and yielded `links` product URLs
    fn listing_page_fetched(&self, _page: u32, _url: &str, _links: usize) {}

    /// A listing page could not be fetched
    fn listing_page_failed(&self, _page: u32, _url: &str, _reason: &SkipReason) {}

    /// Discovery is over; `total_urls` product URLs were found
    fn pagination_finished(&self, _end: &PaginationEnd, _total_urls: usize) {}

    /// The worker pool is about to process `total` product URLs
    fn extraction_started(&self, _total: usize) {}

    /// One product URL was processed; `completed` counts finished URLs so far
    fn product_finished(&self, _completed: usize, _total: usize, _outcome: &ProductOutcome) {}

    /// A structure image could not be stored for the product `identifier`
    fn image_failed(&self, _identifier: &str, _error: &ImageError) {}

    /// All workers have joined and the result set is final
    fn crawl_finished(&self, _stats: &CrawlStats) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CrawlObserver for NullObserver {}
