/// Outcome of processing one product URL
use crate::product::Product;
use std::fmt;

/// Why a product URL produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The product page answered with a non-success status
    HttpStatus(u16),

    /// Connection, timeout or body read failure
    Network(String),

    /// The worker handling this URL stopped before reaching it
    WorkerAborted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Network(error) => write!(f, "network error: {}", error),
            Self::WorkerAborted => write!(f, "worker aborted"),
        }
    }
}

/// Tagged result of a single product task
///
/// Workers never swallow failures; the coordinator inspects this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductOutcome {
    /// The page was fetched and parsed (fields may still all be empty)
    Scraped(Product),

    /// The page could not be fetched
    Skipped { url: String, reason: SkipReason },
}

impl ProductOutcome {
    /// The product URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Scraped(product) => &product.url,
            Self::Skipped { url, .. } => url,
        }
    }

    /// Consumes the outcome, keeping only records with extracted content
    pub fn into_product(self) -> Option<Product> {
        match self {
            Self::Scraped(product) if !product.is_empty() => Some(product),
            _ => None,
        }
    }
}
