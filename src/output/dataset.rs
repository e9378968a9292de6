//! JSON dataset writer

use crate::product::Product;
use crate::ScraperError;
use std::path::Path;

/// Serializes the products as a pretty-printed JSON array
///
/// Keys of every record are always present; the output for a given input is
/// byte-stable.
pub fn format_dataset(products: &[Product]) -> Result<String, ScraperError> {
    let mut json = serde_json::to_string_pretty(products)?;
    json.push('\n');
    Ok(json)
}

/// Writes the dataset to `path`, replacing any existing file
///
/// # Arguments
///
/// * `products` - Records in discovery order
/// * `path` - Destination file; missing parent directories are created
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the dataset
/// * `Err(ScraperError)` - Failed to serialize or write
pub fn write_dataset(products: &[Product], path: &Path) -> Result<(), ScraperError> {
    let json = format_dataset(products)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    Ok(())
}
