//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs the two phases of a crawl:
//! - Discovery: walking the listing pages sequentially
//! - Extraction: scraping every product page on a fixed pool of workers
//!
//! Workers pull `(index, url)` pairs from a shared queue and store each
//! outcome in a pre-sized slot vector at its index, so the dataset follows
//! discovery order no matter which worker finished first.

use crate::config::Config;
use crate::crawler::extractor::extract_product;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::images::ImageStore;
use crate::crawler::paginator::{normalize_listing_url, PaginationEnd, Paginator};
use crate::output::{write_dataset, CrawlObserver, CrawlStats, TracingObserver};
use crate::product::{Product, ProductOutcome, SkipReason};
use crate::ScraperError;
use chrono::Utc;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// Result of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Non-empty records in discovery order
    pub products: Vec<Product>,

    /// Counters for the run
    pub stats: CrawlStats,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    images: ImageStore,
    observer: Arc<dyn CrawlObserver>,
}

impl Coordinator {
    /// Creates a coordinator that reports through `tracing`
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration, already validated
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScraperError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, ScraperError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Creates a coordinator that reports crawl events to `observer`
    pub fn with_observer(
        config: Config,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, ScraperError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        let images = ImageStore::new(
            config.output.images_dir.clone(),
            config.output.thumbnail_size,
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            images,
            observer,
        })
    }

    /// Crawls one category listing
    ///
    /// Discovery runs to completion before extraction starts. Per-page and
    /// per-image failures are reported to the observer and never fail the run.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Category listing URL
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Products and statistics
    /// * `Err(ScraperError)` - `base_url` is not an HTTP(S) URL
    pub async fn run(&self, base_url: &str) -> Result<CrawlReport, ScraperError> {
        let base_url = normalize_listing_url(base_url)?;
        let mut stats = CrawlStats::new();

        tracing::info!(
            "Starting crawl of {} with {} worker(s)",
            base_url,
            self.config.crawler.concurrency
        );

        let mut paginator = Paginator::new(
            self.client.clone(),
            base_url,
            &self.config.crawler,
            Arc::clone(&self.observer),
        );
        let urls = paginator.discover().await;

        let end = paginator
            .end()
            .cloned()
            .unwrap_or(PaginationEnd::Exhausted {
                page: paginator.pages_requested(),
            });
        self.observer.pagination_finished(&end, urls.len());
        stats.listing_pages = paginator.pages_requested();
        stats.pagination_end = Some(end);
        stats.urls_discovered = urls.len();

        let outcomes = self.scrape_all(urls).await;

        let mut products = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                ProductOutcome::Scraped(product) => {
                    stats.pages_scraped += 1;
                    if !product.img_source_url.is_empty() && product.image_path.is_empty() {
                        stats.image_failures += 1;
                    }
                    if product.is_empty() {
                        stats.empty_records += 1;
                    } else {
                        products.push(product);
                    }
                }
                ProductOutcome::Skipped { .. } => stats.pages_skipped += 1,
            }
        }

        stats.products_kept = products.len();
        stats.finished_at = Some(Utc::now());
        self.observer.crawl_finished(&stats);

        Ok(CrawlReport { products, stats })
    }

    /// Scrapes every URL on the worker pool
    ///
    /// Returns one outcome per input URL, in input order. Each outcome is
    /// stored at its index as soon as it is finished, so a worker that panics
    /// only loses the URL it was on; that URL and any left in the queue come
    /// back as `Skipped` with `SkipReason::WorkerAborted`.
    pub async fn scrape_all(&self, urls: Vec<Url>) -> Vec<ProductOutcome> {
        let total = urls.len();
        self.observer.extraction_started(total);
        if total == 0 {
            return Vec::new();
        }

        let queue: Arc<Mutex<VecDeque<(usize, Url)>>> =
            Arc::new(Mutex::new(urls.iter().cloned().enumerate().collect()));
        let slots: Arc<Mutex<Vec<Option<ProductOutcome>>>> =
            Arc::new(Mutex::new((0..total).map(|_| None).collect()));
        let completed = Arc::new(AtomicUsize::new(0));
        let scraper = ProductScraper {
            client: self.client.clone(),
            images: self.images.clone(),
            observer: Arc::clone(&self.observer),
        };

        let workers = self.config.crawler.concurrency.clamp(1, total);
        tracing::debug!("Spawning {} workers for {} products", workers, total);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let slots = Arc::clone(&slots);
            let completed = Arc::clone(&completed);
            let scraper = scraper.clone();

            handles.push(tokio::spawn(async move {
                while let Some((index, url)) = next_task(&queue) {
                    let outcome = scraper.scrape(&url).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    scraper.observer.product_finished(done, total, &outcome);
                    lock(&slots)[index] = Some(outcome);
                }
            }));
        }

        for (worker, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} aborted: {}", worker, e);
            }
        }

        let slots = std::mem::take(&mut *lock(&slots));
        slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| ProductOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::WorkerAborted,
                })
            })
            .collect()
    }
}

fn next_task(queue: &Mutex<VecDeque<(usize, Url)>>) -> Option<(usize, Url)> {
    lock(queue).pop_front()
}

/// Locks a mutex shared with the workers
///
/// Neither the queue nor the slots are left half-updated by a panic, so a
/// poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-worker handle for scraping one product page
#[derive(Clone)]
struct ProductScraper {
    client: Client,
    images: ImageStore,
    observer: Arc<dyn CrawlObserver>,
}

impl ProductScraper {
    /// Fetches and parses one product page, then stores its structure image
    async fn scrape(&self, url: &Url) -> ProductOutcome {
        let fetched = fetch_url(&self.client, url.as_str()).await;
        if let FetchResult::Success { final_url, .. } = &fetched {
            if final_url != url.as_str() {
                tracing::debug!("{} redirected to {}", url, final_url);
            }
        }

        let html = match fetched.into_body() {
            Ok(html) => html,
            Err(reason) => {
                return ProductOutcome::Skipped {
                    url: url.to_string(),
                    reason,
                }
            }
        };

        let mut product = extract_product(&html, url);

        if !product.img_source_url.is_empty() {
            match self.images.store(&self.client, &product).await {
                Ok(path) => product.image_path = path,
                Err(e) => {
                    let identifier = if product.id.is_empty() {
                        &product.url
                    } else {
                        &product.id
                    };
                    self.observer.image_failed(identifier, &e);
                }
            }
        }

        ProductOutcome::Scraped(product)
    }
}

/// Runs a complete crawl and writes the dataset
///
/// This is the main entry point for a scrape. It will:
/// 1. Build the HTTP client
/// 2. Walk the listing pages of `base_url`
/// 3. Scrape every product page concurrently
/// 4. Write the non-empty records to `output.products-path`
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `base_url` - Category listing URL
/// * `observer` - Receives crawl events
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and the dataset was written
/// * `Err(ScraperError)` - Startup failed or the dataset could not be written
///
/// # Example
///
/// ```no_run
/// use larodan_scraper::config::Config;
/// use larodan_scraper::crawler::run_crawl;
/// use larodan_scraper::output::TracingObserver;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(
///     Config::default(),
///     "https://www.larodan.com/product-category/fatty-acids/",
///     Arc::new(TracingObserver),
/// )
/// .await?;
/// println!("{} products", report.products.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    base_url: &str,
    observer: Arc<dyn CrawlObserver>,
) -> Result<CrawlReport, ScraperError> {
    let products_path = config.output.products_path.clone();

    let coordinator = Coordinator::with_observer(config, observer)?;
    let report = coordinator.run(base_url).await?;

    write_dataset(&report.products, &products_path)?;
    tracing::info!(
        "Wrote {} products to {}",
        report.products.len(),
        products_path.display()
    );

    Ok(report)
}
