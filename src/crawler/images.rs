//! Structure image thumbnails
//!
//! Downloads a product's structure image, shrinks it to fit a square bound
//! and stores it as PNG under a name derived from the product identifier.
//! Every failure is returned to the caller, which logs it and carries on with
//! the rest of the product.

use crate::crawler::fetcher::fetch_bytes;
use crate::product::{Product, SkipReason};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GenericImageView, ImageEncoder};
use reqwest::Client;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while storing a thumbnail
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("download failed: {0}")]
    Fetch(SkipReason),

    #[error("decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("resize task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("no usable file name for {url}")]
    NoFileName { url: String },
}

/// Writes thumbnails into one directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_dimension: u32,
}

impl ImageStore {
    /// Creates a store writing into `dir`, bounding both sides by `max_dimension`
    ///
    /// The directory is created on first use, not here.
    pub fn new(dir: impl Into<PathBuf>, max_dimension: u32) -> Self {
        Self {
            dir: dir.into(),
            max_dimension,
        }
    }

    /// Downloads, shrinks and stores the structure image of `product`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Path of the stored PNG, relative to the working directory
    /// * `Err(ImageError)` - Nothing was stored
    pub async fn store(&self, client: &Client, product: &Product) -> Result<String, ImageError> {
        let stem = thumbnail_stem(product).ok_or_else(|| ImageError::NoFileName {
            url: product.url.clone(),
        })?;

        let bytes = fetch_bytes(client, &product.img_source_url)
            .await
            .into_body()
            .map_err(ImageError::Fetch)?;

        let max_dimension = self.max_dimension;
        let png = tokio::task::spawn_blocking(move || encode_thumbnail(&bytes, max_dimension))
            .await??;

        // create_dir_all succeeds if another worker created the directory first
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.png", stem));
        tokio::fs::write(&path, png).await?;

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Decodes an image, shrinks it to fit `max_dimension` and encodes it as PNG
///
/// Images already within the bound keep their size. Aspect ratio is kept.
pub fn encode_thumbnail(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, image::ImageError> {
    let image = image::load_from_memory(bytes)?;

    let image = if image.width() > max_dimension || image.height() > max_dimension {
        image.thumbnail(max_dimension, max_dimension)
    } else {
        image
    };
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());

    let mut png = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(rgba.as_bytes(), rgba.width(), rgba.height(), rgba.color())?;

    Ok(png)
}

/// Chooses the thumbnail file name (without extension) for a product
///
/// Uses the SKU when present, otherwise the last path segment of the product
/// URL. Characters outside `[A-Za-z0-9._-]` become `_`.
pub fn thumbnail_stem(product: &Product) -> Option<String> {
    let raw = if product.id.is_empty() {
        url::Url::parse(&product.url)
            .ok()?
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()?
            .to_string()
    } else {
        product.id.clone()
    };

    let stem: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // "." and ".." would escape or alias the directory
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        None
    } else {
        Some(stem)
    }
}
