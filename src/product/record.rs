/// Product record definitions
///
/// One `Product` is built per product page and never modified afterwards.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single catalog entry as written to the dataset
///
/// Optional text fields use the empty string for "absent" so that every key
/// is present in the JSON output. `packaging` is ordered by key, which keeps
/// repeated runs byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Vendor SKU
    pub id: String,

    /// Display title
    pub name: String,

    /// Chemical registry number
    #[serde(rename = "CAS")]
    pub cas: String,

    /// Molecular formula
    pub structure: String,

    pub smiles: String,

    #[serde(rename = "molecularWeight")]
    pub molecular_weight: String,

    /// Short description text
    pub description: String,

    /// Absolute URL of the product page
    pub url: String,

    /// Relative path of the stored thumbnail
    #[serde(rename = "imagePath")]
    pub image_path: String,

    /// Absolute URL of the original structure image
    #[serde(rename = "imgSourceUrl")]
    pub img_source_url: String,

    /// Absolute URL of the safety data sheet
    #[serde(rename = "pdfMsdsUrl")]
    pub pdf_msds_url: String,

    pub synonyms: Vec<String>,

    /// Package size label to price
    pub packaging: BTreeMap<String, String>,
}

impl Product {
    /// Creates an empty record for the given page URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns true if nothing was extracted for this product
    ///
    /// `url` is the crawl input and always set, so it does not count.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.name.is_empty()
            && self.cas.is_empty()
            && self.structure.is_empty()
            && self.smiles.is_empty()
            && self.molecular_weight.is_empty()
            && self.description.is_empty()
            && self.image_path.is_empty()
            && self.img_source_url.is_empty()
            && self.pdf_msds_url.is_empty()
            && self.synonyms.is_empty()
            && self.packaging.is_empty()
    }
}
