//! Product module holding the dataset record and per-task outcomes
//!
//! # Components
//!
//! - `Product`: one catalog entry, serialized as-is into the dataset
//! - `ProductOutcome`: tagged result of processing one product URL
//! - `SkipReason`: why a product URL yielded no record

mod outcome;
mod record;

// Re-export main types
pub use outcome::{ProductOutcome, SkipReason};
pub use record::Product;
