//! Crawl statistics
//!
//! Counters gathered by the coordinator for the end-of-run summary.

use crate::crawler::PaginationEnd;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// When discovery started
    pub started_at: DateTime<Utc>,

    /// When the last worker joined
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages requested, including the terminating one
    pub listing_pages: u32,

    /// Why discovery stopped
    pub pagination_end: Option<PaginationEnd>,

    /// Product URLs found across all listing pages
    pub urls_discovered: usize,

    /// Product pages fetched and parsed
    pub pages_scraped: usize,

    /// Product pages that could not be fetched
    pub pages_skipped: usize,

    /// Fetched pages that yielded no data at all
    pub empty_records: usize,

    /// Products whose structure image could not be stored
    pub image_failures: usize,

    /// Records in the final dataset
    pub products_kept: usize,
}

impl CrawlStats {
    /// Creates empty statistics for a run starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_pages: 0,
            pagination_end: None,
            urls_discovered: 0,
            pages_scraped: 0,
            pages_skipped: 0,
            empty_records: 0,
            image_failures: 0,
            products_kept: 0,
        }
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of discovered URLs that made it into the dataset, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.urls_discovered == 0 {
            return 0.0;
        }
        (self.products_kept as f64 / self.urls_discovered as f64) * 100.0
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Discovery:");
    println!("  Listing pages requested: {}", stats.listing_pages);
    if let Some(end) = &stats.pagination_end {
        println!("  Stopped because: {}", end);
    }
    println!("  Product URLs found: {}", stats.urls_discovered);
    println!();

    println!("Extraction:");
    println!("  Pages scraped: {}", stats.pages_scraped);
    println!("  Pages skipped: {}", stats.pages_skipped);
    println!("  Empty records dropped: {}", stats.empty_records);
    println!("  Image failures: {}", stats.image_failures);
    println!();

    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!(
        "Success Rate: {:.1}% ({} / {} products written)",
        stats.success_rate(),
        stats.products_kept,
        stats.urls_discovered
    );
}
