//! Pre-normalization product data as an extractor saw it

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::platform::PlatformType;

/// One purchasable variant as produced by an extractor.
///
/// Values are kept close to the source payload: prices stay as the raw JSON
/// value, the description stays HTML. The normalization engine owns every
/// interpretation of these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub platform: PlatformType,
    pub title: String,
    pub brand: String,
    pub available: Option<bool>,
    pub price: Value,
    pub weight_grams: Option<f64>,
    pub pack_label: String,
    pub sku: Value,
    pub description_html: String,
    pub updated_at: String,
    pub product_page: String,
    pub website: String,
    pub images: Vec<String>,
    pub storage_condition: String,
    pub fetched_at: DateTime<Utc>,
}

impl RawRecord {
    /// Empty record for the given platform; extractors fill in what they find
    pub fn new(platform: PlatformType, brand: &str, website: &str) -> Self {
        Self {
            platform,
            title: String::new(),
            brand: brand.to_string(),
            available: None,
            price: Value::Null,
            weight_grams: None,
            pack_label: String::new(),
            sku: Value::Null,
            description_html: String::new(),
            updated_at: String::new(),
            product_page: String::new(),
            website: website.to_string(),
            images: Vec::new(),
            storage_condition: String::new(),
            fetched_at: Utc::now(),
        }
    }
}
