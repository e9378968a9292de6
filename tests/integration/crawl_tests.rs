//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a small fake catalog and run the full
//! pipeline end-to-end: pagination, concurrent extraction, thumbnails and the
//! JSON dataset.

use image::GenericImageView;
use larodan_scraper::config::Config;
use larodan_scraper::crawler::{run_crawl, ImageError, PaginationEnd};
use larodan_scraper::output::{CrawlObserver, CrawlStats, NullObserver};
use larodan_scraper::product::{Product, ProductOutcome, SkipReason};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATEGORY: &str = "/product-category/fatty-acids";

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &Path, concurrency: usize) -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = concurrency;
    config.crawler.page_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.output.products_path = dir.join("products.json");
    config.output.images_dir = dir.join("images");
    config
}

fn listing_html(slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<li class="product"><a class="woocommerce-LoopProduct-link" href="/product/{}/">{}</a></li>"#,
                slug, slug
            )
        })
        .collect();
    format!(r#"<html><body><ul class="products">{}</ul></body></html>"#, items)
}

fn product_html(name: &str, sku: &str, image_src: Option<&str>) -> String {
    let image = image_src
        .map(|src| format!(r#"<div class="prod-structure"><img src="{}"></div>"#, src))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <h1 class="product_title">{name}</h1>
        <span class="sku">{sku}</span>
        <div class="product-prop">CAS number: 112-80-1</div>
        <div class="product-prop">Molecular weight: 282.46</div>
        <div class="product-prop-synonyms">Synonyms: cis-9-Octadecenoic acid, C18:1</div>
        {image}
        <table class="product-variations-table">
          <tr><td>x</td><td>{sku}-100 mg</td><td>€ 52</td></tr>
        </table>
        </body></html>"#
    )
}

async fn mount_listing_page(server: &MockServer, page: u32, slugs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("{}/page/{}/", CATEGORY, page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(slugs)))
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, slug: &str, body: String, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/product/{}/", slug)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 30, 30]),
    ));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

fn read_dataset(dir: &Path) -> Vec<Product> {
    let content = std::fs::read_to_string(dir.join("products.json")).expect("Dataset not written");
    serde_json::from_str(&content).expect("Dataset is not valid JSON")
}

/// Observer that keeps every event for later inspection
#[derive(Default)]
struct RecordingObserver {
    completed: Mutex<Vec<usize>>,
    pagination_ends: Mutex<Vec<PaginationEnd>>,
    image_failures: Mutex<Vec<String>>,
    finished: Mutex<u32>,
}

impl CrawlObserver for RecordingObserver {
    fn pagination_finished(&self, end: &PaginationEnd, _total_urls: usize) {
        self.pagination_ends.lock().unwrap().push(end.clone());
    }

    fn product_finished(&self, completed: usize, _total: usize, _outcome: &ProductOutcome) {
        self.completed.lock().unwrap().push(completed);
    }

    fn image_failed(&self, identifier: &str, _error: &ImageError) {
        self.image_failures.lock().unwrap().push(identifier.to_string());
    }

    fn crawl_finished(&self, _stats: &CrawlStats) {
        *self.finished.lock().unwrap() += 1;
    }
}

#[tokio::test]
async fn test_full_crawl_keeps_discovery_order() {
    let server = MockServer::start().await;
    let slugs = ["p1", "p2", "p3", "p4", "p5"];

    mount_listing_page(&server, 1, &slugs[..3]).await;
    mount_listing_page(&server, 2, &slugs[3..]).await;
    mount_listing_page(&server, 3, &[]).await;

    // Earlier products answer slower, so workers finish in reverse order
    for (i, slug) in slugs.iter().enumerate() {
        let delay = (slugs.len() - i) as u64 * 40;
        let body = product_html(&format!("Product {}", i + 1), &format!("90-{}", i + 1), None);
        mount_product(&server, slug, body, delay).await;
    }

    let dir = TempDir::new().unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let report = run_crawl(
        create_test_config(dir.path(), 4),
        &format!("{}{}", server.uri(), CATEGORY),
        observer.clone(),
    )
    .await
    .expect("Crawl failed");

    let expected_urls: Vec<String> = slugs
        .iter()
        .map(|slug| format!("{}/product/{}/", server.uri(), slug))
        .collect();
    let urls: Vec<String> = report.products.iter().map(|p| p.url.clone()).collect();
    assert_eq!(urls, expected_urls);

    let written = read_dataset(dir.path());
    assert_eq!(written, report.products);
    assert_eq!(written[0].name, "Product 1");
    assert_eq!(written[0].cas, "112-80-1");
    assert_eq!(written[0].molecular_weight, "282.46");
    assert_eq!(written[0].synonyms, vec!["cis-9-Octadecenoic acid", "C18:1"]);
    assert_eq!(written[0].packaging.get("100 mg").map(String::as_str), Some("€ 52"));

    assert_eq!(report.stats.listing_pages, 3);
    assert_eq!(report.stats.urls_discovered, 5);
    assert_eq!(report.stats.products_kept, 5);
    assert_eq!(
        report.stats.pagination_end,
        Some(PaginationEnd::Exhausted { page: 3 })
    );

    // Progress counts every URL exactly once
    let mut completed = observer.completed.lock().unwrap().clone();
    completed.sort_unstable();
    assert_eq!(completed, vec![1, 2, 3, 4, 5]);
    assert_eq!(observer.pagination_ends.lock().unwrap().len(), 1);
    assert_eq!(*observer.finished.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_pagination_stops_at_first_empty_page() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["p1"]).await;
    mount_listing_page(&server, 2, &[]).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/page/3/", CATEGORY)))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["p9"])))
        .expect(0)
        .mount(&server)
        .await;
    mount_product(&server, "p1", product_html("Only", "90-1", None), 0).await;

    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        create_test_config(dir.path(), 2),
        &format!("{}{}/", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.stats.listing_pages, 2);
    assert_eq!(
        report.stats.pagination_end,
        Some(PaginationEnd::Exhausted { page: 2 })
    );
}

#[tokio::test]
async fn test_first_page_failure_writes_empty_dataset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/page/1/", CATEGORY)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        create_test_config(dir.path(), 1),
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("A failed listing must not fail the run");

    assert!(report.products.is_empty());
    assert_eq!(
        report.stats.pagination_end,
        Some(PaginationEnd::FetchFailed {
            page: 1,
            reason: SkipReason::HttpStatus(500),
        })
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("products.json")).unwrap(),
        "[]\n"
    );
}

#[tokio::test]
async fn test_tolerated_page_failure_continues_discovery() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["p1"]).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/page/2/", CATEGORY)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_listing_page(&server, 3, &["p3"]).await;
    mount_listing_page(&server, 4, &[]).await;
    mount_product(&server, "p1", product_html("One", "90-1", None), 0).await;
    mount_product(&server, "p3", product_html("Three", "90-3", None), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), 2);
    config.crawler.max_page_failures = 2;

    let report = run_crawl(
        config,
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    let names: Vec<&str> = report.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Three"]);
    assert_eq!(report.stats.listing_pages, 4);
}

#[tokio::test]
async fn test_skipped_and_empty_products_are_dropped() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["good", "missing", "blank"]).await;
    mount_listing_page(&server, 2, &[]).await;
    mount_product(&server, "good", product_html("Good", "90-1", None), 0).await;
    mount_product(
        &server,
        "blank",
        "<html><body><p>Nothing here</p></body></html>".to_string(),
        0,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/product/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        create_test_config(dir.path(), 3),
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.products[0].name, "Good");
    assert_eq!(report.stats.urls_discovered, 3);
    assert_eq!(report.stats.pages_scraped, 2);
    assert_eq!(report.stats.pages_skipped, 1);
    assert_eq!(report.stats.empty_records, 1);
    assert_eq!(read_dataset(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_structure_image_is_stored_as_thumbnail() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["oleic"]).await;
    mount_listing_page(&server, 2, &[]).await;
    mount_product(
        &server,
        "oleic",
        product_html("Oleic acid", "90-1801", Some("/media/oleic.png")),
        0,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/oleic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(300, 150)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        create_test_config(dir.path(), 1),
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    let product = &report.products[0];
    assert_eq!(
        product.img_source_url,
        format!("{}/media/oleic.png", server.uri())
    );

    let stored = dir.path().join("images").join("90-1801.png");
    assert_eq!(Path::new(&product.image_path), stored.as_path());

    let thumbnail = image::open(&stored).expect("Thumbnail is not a readable image");
    assert_eq!((thumbnail.width(), thumbnail.height()), (100, 50));
    assert_eq!(report.stats.image_failures, 0);
}

#[tokio::test]
async fn test_image_failure_keeps_product() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["stearic"]).await;
    mount_listing_page(&server, 2, &[]).await;
    mount_product(
        &server,
        "stearic",
        product_html("Stearic acid", "10-1800", Some("/media/gone.png")),
        0,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let report = run_crawl(
        create_test_config(dir.path(), 1),
        &format!("{}{}", server.uri(), CATEGORY),
        observer.clone(),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.products.len(), 1);
    let product = &report.products[0];
    assert_eq!(product.name, "Stearic acid");
    assert!(!product.img_source_url.is_empty());
    assert_eq!(product.image_path, "");
    assert_eq!(report.stats.image_failures, 1);
    assert_eq!(*observer.image_failures.lock().unwrap(), vec!["10-1800"]);
    assert!(!dir.path().join("images").join("10-1800.png").exists());
}

#[tokio::test]
async fn test_repeated_runs_write_identical_output() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["a", "b", "c"]).await;
    mount_listing_page(&server, 2, &[]).await;
    for (slug, delay) in [("a", 60), ("b", 0), ("c", 30)] {
        let body = product_html(&format!("Product {}", slug), &format!("90-{}", slug), None);
        mount_product(&server, slug, body, delay).await;
    }

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}{}", server.uri(), CATEGORY);

    run_crawl(create_test_config(dir.path(), 3), &base_url, Arc::new(NullObserver))
        .await
        .expect("First crawl failed");
    let first = std::fs::read(dir.path().join("products.json")).unwrap();

    run_crawl(create_test_config(dir.path(), 3), &base_url, Arc::new(NullObserver))
        .await
        .expect("Second crawl failed");
    let second = std::fs::read(dir.path().join("products.json")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_more_workers_than_products() {
    let server = MockServer::start().await;

    mount_listing_page(&server, 1, &["solo"]).await;
    mount_listing_page(&server, 2, &[]).await;
    mount_product(&server, "solo", product_html("Solo", "90-7", None), 0).await;

    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        create_test_config(dir.path(), 16),
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.products[0].id, "90-7");
}

#[tokio::test]
async fn test_unwritable_output_fails_run() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 1, &[]).await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut config = create_test_config(dir.path(), 1);
    config.output.products_path = blocker.join("products.json");

    let result = run_crawl(
        config,
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_workers_share_new_images_dir() {
    let server = MockServer::start().await;
    let slugs = ["m1", "m2", "m3", "m4", "m5", "m6"];

    mount_listing_page(&server, 1, &slugs).await;
    mount_listing_page(&server, 2, &[]).await;
    for (i, slug) in slugs.iter().enumerate() {
        let image_path = format!("/media/{}.png", slug);
        let body = product_html(
            &format!("Product {}", slug),
            &format!("20-{}", i + 1),
            Some(&image_path),
        );
        mount_product(&server, slug, body, 0).await;
        Mock::given(method("GET"))
            .and(path(image_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(120, 240)))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let images_dir = dir.path().join("nested").join("images");
    let mut config = create_test_config(dir.path(), 6);
    config.output.images_dir = images_dir.clone();
    assert!(!images_dir.exists());

    let report = run_crawl(
        config,
        &format!("{}{}", server.uri(), CATEGORY),
        Arc::new(NullObserver),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.products.len(), slugs.len());
    assert_eq!(report.stats.image_failures, 0);
    for (i, product) in report.products.iter().enumerate() {
        let stored = images_dir.join(format!("20-{}.png", i + 1));
        assert_eq!(Path::new(&product.image_path), stored.as_path());
        let thumbnail = image::open(&stored).expect("Thumbnail missing");
        assert_eq!(thumbnail.dimensions(), (50, 100));
    }
}
