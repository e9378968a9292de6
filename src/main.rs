//! Larodan scraper main entry point
//!
//! This is the command-line interface for the Larodan catalog scraper.

use anyhow::Context;
use clap::Parser;
use larodan_scraper::config::{load_config_with_hash, validate, Config};
use larodan_scraper::crawler::run_crawl;
use larodan_scraper::output::{print_statistics, ProgressObserver};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const BANNER: &str = "LARODAN WEB SCRAPER";

/// Fixed per-character delay of the banner animation
///
/// Deliberately constant, with no pause afterwards, so start-up takes the
/// same time on every run.
const BANNER_CHAR_DELAY: Duration = Duration::from_millis(40);

/// Larodan scraper: a polite catalog harvester
///
/// Walks the paginated listing of one product category, scrapes every
/// product page concurrently and writes the records to a JSON file. Structure
/// images are stored as PNG thumbnails.
#[derive(Parser, Debug)]
#[command(name = "larodan-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A polite catalog harvester", long_about = None)]
struct Cli {
    /// Category listing URL, e.g. https://www.larodan.com/product-category/fatty-acids/
    #[arg(value_name = "URL")]
    url: String,

    /// Number of concurrent product workers [default: 1]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the JSON dataset [default: products.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory receiving structure thumbnails [default: images]
    #[arg(long, value_name = "DIR")]
    images_dir: Option<PathBuf>,

    /// Delay between listing page requests in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Skip the startup banner
    #[arg(long)]
    no_banner: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if !cli.no_banner && !cli.quiet {
        print_banner(BANNER).await;
    }

    let config = build_config(&cli)?;

    let report = run_crawl(config, &cli.url, Arc::new(ProgressObserver::new()))
        .await
        .with_context(|| format!("Scrape of {} failed", cli.url))?;

    if !cli.quiet {
        print_statistics(&report.stats);
    }
    tracing::info!("Scraping completed successfully!");

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("larodan_scraper=info,warn"),
            1 => EnvFilter::new("larodan_scraper=debug,info"),
            2 => EnvFilter::new("larodan_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the command line over the config file over the defaults
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = usize::try_from(concurrency).unwrap_or(usize::MAX);
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.page_delay_ms = delay_ms;
    }
    if let Some(output) = &cli.output {
        config.output.products_path = output.clone();
    }
    if let Some(images_dir) = &cli.images_dir {
        config.output.images_dir = images_dir.clone();
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Prints `text` one character at a time
async fn print_banner(text: &str) {
    let mut stdout = std::io::stdout();
    for c in text.chars() {
        print!("{}", c);
        let _ = stdout.flush();
        tokio::time::sleep(BANNER_CHAR_DELAY).await;
    }
    println!("\n");
}
