//! Terminal progress bar for the extraction phase

use crate::crawler::{ImageError, PaginationEnd};
use crate::output::logging::TracingObserver;
use crate::output::stats::CrawlStats;
use crate::output::traits::CrawlObserver;
use crate::product::{ProductOutcome, SkipReason};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "Scraping products [{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})";

/// Shows a progress bar while products are scraped and logs everything else
///
/// Log lines are printed through `ProgressBar::suspend` so they do not tear
/// the bar.
pub struct ProgressObserver {
    bar: ProgressBar,
    log: TracingObserver,
}

impl ProgressObserver {
    pub fn new() -> Self {
        // Hidden until extraction starts; discovery only logs
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        Self {
            bar,
            log: TracingObserver,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlObserver for ProgressObserver {
    fn listing_page_fetched(&self, page: u32, url: &str, links: usize) {
        self.log.listing_page_fetched(page, url, links);
    }

    fn listing_page_failed(&self, page: u32, url: &str, reason: &SkipReason) {
        self.log.listing_page_failed(page, url, reason);
    }

    fn pagination_finished(&self, end: &PaginationEnd, total_urls: usize) {
        self.log.pagination_finished(end, total_urls);
    }

    fn extraction_started(&self, total: usize) {
        self.log.extraction_started(total);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn product_finished(&self, completed: usize, total: usize, outcome: &ProductOutcome) {
        self.bar
            .suspend(|| self.log.product_finished(completed, total, outcome));
        self.bar.inc(1);
    }

    fn image_failed(&self, identifier: &str, error: &ImageError) {
        self.bar.suspend(|| self.log.image_failed(identifier, error));
    }

    fn crawl_finished(&self, stats: &CrawlStats) {
        self.bar.finish_and_clear();
        self.log.crawl_finished(stats);
    }
}
