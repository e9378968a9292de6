//! Output module for crawl results and progress reporting
//!
//! This module handles:
//! - Writing the JSON dataset
//! - Reporting crawl events (logging, progress bar)
//! - Recording crawl statistics

mod dataset;
mod logging;
mod progress;
pub mod stats;
mod traits;

pub use dataset::{format_dataset, write_dataset};
pub use logging::TracingObserver;
pub use progress::ProgressObserver;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{CrawlObserver, NullObserver};
