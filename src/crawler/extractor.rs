//! HTML extraction for listing and product pages
//!
//! This module handles parsing HTML content to extract:
//! - Product links from a category listing page
//! - Every product field from a product page
//!
//! All lookups are optional. A missing element leaves its field at the empty
//! default and is never reported as an error. Parsing is synchronous and
//! finishes before any network call, so no `Html` document is held across
//! an await point.

use crate::product::Product;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Marker for product links on a listing page
const PRODUCT_LINK_SELECTOR: &str = "a.woocommerce-LoopProduct-link[href]";

const NAME_SELECTOR: &str = "h1.product_title";
const SKU_SELECTOR: &str = "span.sku";
const PROPERTY_SELECTOR: &str = "div.product-prop";
const SYNONYMS_SELECTOR: &str = "div.product-prop-synonyms";
const DESCRIPTION_SELECTOR: &str = "div.woocommerce-product-details__short-description";
const STRUCTURE_IMAGE_SELECTOR: &str = "div.prod-structure img";
const VARIATION_ROW_SELECTOR: &str = "table.product-variations-table tr";

/// Labelled product properties, matched by case-insensitive label prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Cas,
    Formula,
    Weight,
    Smiles,
}

const PROPERTY_LABELS: &[(&str, Property)] = &[
    ("CAS number", Property::Cas),
    ("Molecular formula", Property::Formula),
    ("Molecular weight", Property::Weight),
    ("Smiles", Property::Smiles),
];

/// Extracts the product links from a listing page
///
/// Links are resolved against the listing page URL and returned in document
/// order. Duplicates are kept.
///
/// # Example
///
/// ```
/// use larodan_scraper::crawler::extract_product_links;
/// use url::Url;
///
/// let html = r#"<a class="woocommerce-LoopProduct-link" href="/product/oleic-acid/">Oleic acid</a>"#;
/// let page = Url::parse("https://example.com/category/page/1/").unwrap();
/// assert_eq!(
///     extract_product_links(html, &page),
///     vec!["https://example.com/product/oleic-acid/".to_string()]
/// );
/// ```
pub fn extract_product_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(PRODUCT_LINK_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

/// Extracts a product record from a product page
///
/// The returned record has every field the page provides, except
/// `image_path` which is filled in once the structure image is stored.
///
/// # Arguments
///
/// * `html` - The product page HTML
/// * `page_url` - The product page URL, used as `url` and for resolving links
pub fn extract_product(html: &str, page_url: &Url) -> Product {
    let document = Html::parse_document(html);
    let mut product = Product::new(page_url.as_str());

    product.name = select_text(&document, NAME_SELECTOR).unwrap_or_default();
    product.id = select_text(&document, SKU_SELECTOR).unwrap_or_default();

    for (property, value) in extract_properties(&document) {
        let slot = match property {
            Property::Cas => &mut product.cas,
            Property::Formula => &mut product.structure,
            Property::Weight => &mut product.molecular_weight,
            Property::Smiles => &mut product.smiles,
        };
        // First occurrence wins
        if slot.is_empty() {
            *slot = value;
        }
    }

    product.synonyms = select_text(&document, SYNONYMS_SELECTOR)
        .map(|text| parse_synonyms(&text))
        .unwrap_or_default();
    product.description = select_text(&document, DESCRIPTION_SELECTOR).unwrap_or_default();
    product.img_source_url = extract_structure_image(&document, page_url).unwrap_or_default();
    product.pdf_msds_url = extract_pdf_link(&document, page_url).unwrap_or_default();

    for (size, price) in extract_packaging(&document) {
        product.packaging.insert(size, price);
    }

    product
}

/// Splits a labelled property text on its first `:`
///
/// Returns the trimmed label and the trimmed value, or `None` if the text
/// carries no delimiter.
///
/// # Example
///
/// ```
/// use larodan_scraper::crawler::parse_labeled_value;
///
/// assert_eq!(
///     parse_labeled_value("Molecular weight: 123.45 g/mol"),
///     Some(("Molecular weight", "123.45 g/mol"))
/// );
/// ```
pub fn parse_labeled_value(text: &str) -> Option<(&str, &str)> {
    let (label, value) = text.split_once(':')?;
    Some((label.trim(), value.trim()))
}

/// Splits a synonyms text blob into individual names
///
/// Everything up to and including the first `:` is the label and is dropped.
/// Empty tokens are skipped.
pub fn parse_synonyms(text: &str) -> Vec<String> {
    let list = text.split_once(':').map_or(text, |(_, rest)| rest);

    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the package size label from a variation cell
///
/// Cells read like `Oleic acid - 100 mg`; the size is whatever follows the
/// last dash.
pub fn parse_package_size(text: &str) -> &str {
    text.rsplit('-').next().unwrap_or_default().trim()
}

/// Collects every recognised labelled property in document order
fn extract_properties(document: &Html) -> Vec<(Property, String)> {
    let Ok(selector) = Selector::parse(PROPERTY_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let text = element_text(element);
            let (label, value) = parse_labeled_value(&text)?;
            let property = match_property(label)?;
            Some((property, value.to_string()))
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn match_property(label: &str) -> Option<Property> {
    PROPERTY_LABELS
        .iter()
        .find(|(prefix, _)| {
            label
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map(|(_, property)| *property)
}

/// Finds the structure image source, resolved to an absolute URL
fn extract_structure_image(document: &Html, page_url: &Url) -> Option<String> {
    let selector = Selector::parse(STRUCTURE_IMAGE_SELECTOR).ok()?;
    let src = document.select(&selector).next()?.value().attr("src")?;
    resolve_link(src, page_url)
}

/// Finds the first link to a PDF document (the safety data sheet)
fn extract_pdf_link(document: &Html, page_url: &Url) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .find(|href| href.trim().to_ascii_lowercase().ends_with(".pdf"))
        .and_then(|href| resolve_link(href, page_url))
}

/// Reads `(size, price)` pairs from the variations table
///
/// Only rows with exactly three cells are product variations; header and
/// spacer rows are skipped.
fn extract_packaging(document: &Html) -> Vec<(String, String)> {
    let (Ok(row_selector), Ok(cell_selector)) =
        (Selector::parse(VARIATION_ROW_SELECTOR), Selector::parse("td"))
    else {
        return Vec::new();
    };

    let mut packaging = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() != 3 {
            continue;
        }

        let size = parse_package_size(&element_text(cells[1])).to_string();
        if size.is_empty() {
            continue;
        }
        packaging.push((size, element_text(cells[2])));
    }

    packaging
}

/// Returns the trimmed text of the first element matching `css`
fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
