//! Observer that turns crawl events into log lines

use crate::crawler::{ImageError, PaginationEnd};
use crate::output::stats::CrawlStats;
use crate::output::traits::CrawlObserver;
use crate::product::{ProductOutcome, SkipReason};

/// Logs crawl events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn listing_page_fetched(&self, page: u32, url: &str, links: usize) {
        tracing::debug!("Listing page {} ({}): {} products", page, url, links);
    }

    fn listing_page_failed(&self, page: u32, url: &str, reason: &SkipReason) {
        tracing::warn!("Failed to fetch page {} ({}): {}", page, url, reason);
    }

    fn pagination_finished(&self, end: &PaginationEnd, total_urls: usize) {
        tracing::info!("Pagination finished: {}", end);
        tracing::info!("Found {} products to scrape", total_urls);
    }

    fn extraction_started(&self, total: usize) {
        tracing::debug!("Scraping {} product pages", total);
    }

    fn product_finished(&self, completed: usize, total: usize, outcome: &ProductOutcome) {
        match outcome {
            ProductOutcome::Scraped(product) => {
                tracing::debug!("[{}/{}] Scraped {}", completed, total, product.url);
            }
            ProductOutcome::Skipped { url, reason } => {
                tracing::warn!("Failed to fetch product page {}: {}", url, reason);
            }
        }
    }

    fn image_failed(&self, identifier: &str, error: &ImageError) {
        tracing::warn!("Error processing image for product {}: {}", identifier, error);
    }

    fn crawl_finished(&self, stats: &CrawlStats) {
        tracing::info!(
            "Successfully scraped {} products ({} skipped, {} empty)",
            stats.products_kept,
            stats.pages_skipped,
            stats.empty_records
        );
    }
}
