//! Crawler module for page fetching and processing
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching and failure classification
//! - Listing pagination with a politeness delay
//! - Product page extraction
//! - Structure image thumbnails
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod images;
mod paginator;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use extractor::{
    extract_product, extract_product_links, parse_labeled_value, parse_package_size,
    parse_synonyms,
};
pub use fetcher::{build_http_client, fetch_bytes, fetch_url, FetchResult};
pub use images::{encode_thumbnail, thumbnail_stem, ImageError, ImageStore};
pub use paginator::{normalize_listing_url, page_url, PaginationEnd, Paginator};
