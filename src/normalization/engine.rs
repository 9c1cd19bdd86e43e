//! NormalizationEngine - raw record to canonical product
//!
//! The engine is a stateless value. It performs no I/O and reads no clock:
//! `scraped_at` comes from the record's fetch time, so normalizing the same
//! record twice yields the same product.

use chrono::SecondsFormat;

use crate::domain::{CanonicalProduct, RawRecord};

use super::category::infer_category;
use super::claims::claims_from_description;
use super::ingredients::extract_ingredients;
use super::pack_size::{grams_from_pack_size, normalize_pack_size, pack_count};
use super::pricing::{normalize_sku, parse_price, price_per_kg_or_l, unit_price};

pub const STATUS_LAUNCHED: &str = "Launched";
pub const AVAILABILITY_ACTIVE: &str = "Active";
pub const AVAILABILITY_OOS: &str = "OOS";
pub const CHANNEL_D2C: &str = "D2C";
pub const DISTRIBUTION_BRAND_WEBSITE: &str = "Brand website";
pub const WEIGHT_UNIT: &str = "g";

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationEngine;

impl NormalizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Canonical product for one raw record
    pub fn normalize(&self, raw: &RawRecord) -> CanonicalProduct {
        let title = raw.title.trim().to_string();
        let brand = raw.brand.trim().to_string();
        let inferred = infer_category(&title);

        let pack_label = normalize_pack_size(&raw.pack_label);
        let weight = raw
            .weight_grams
            .filter(|w| w.is_finite() && *w > 0.0)
            .or_else(|| grams_from_pack_size(&pack_label));
        let pack_size = match (pack_label.is_empty(), weight) {
            (true, Some(grams)) => normalize_pack_size(&format!("{grams}g")),
            _ => pack_label,
        };

        let price = parse_price(&raw.price);
        let availability = availability_label(raw.available);
        let ingredients = extract_ingredients(&raw.description_html);

        CanonicalProduct {
            product_page: raw.product_page.trim().to_string(),
            category: inferred.category.to_string(),
            segment: inferred.segment.to_string(),
            animal_product_replicated: inferred.animal_product_replicated.to_string(),
            positioning: inferred.positioning.to_string(),
            consumption_format: inferred.consumption_format.to_string(),
            storage_condition: raw.storage_condition.clone(),
            status: STATUS_LAUNCHED.to_string(),
            in_stock: availability_flag(availability),
            availability: availability.to_string(),
            last_updated: date_portion(&raw.updated_at),
            price_inr: price,
            unit_price: unit_price(price, pack_count(&pack_size)),
            price_per_kg_l: price_per_kg_or_l(price, weight),
            weight: weight.unwrap_or(0.0),
            weight_unit: WEIGHT_UNIT.to_string(),
            pack_size,
            ingredient_count: i64::try_from(ingredients.count()).unwrap_or(i64::MAX),
            ingredients_list: ingredients.joined(),
            claims: claims_from_description(&raw.description_html),
            channel: CHANNEL_D2C.to_string(),
            distribution_channels: DISTRIBUTION_BRAND_WEBSITE.to_string(),
            website: raw.website.clone(),
            images: raw.images.join(", "),
            sku_code: normalize_sku(&raw.sku),
            source_name: format!("{brand} Official Website"),
            source_links: raw.product_page.trim().to_string(),
            scraped_at: raw.fetched_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            title,
            brand,
            ..Default::default()
        }
    }
}

fn availability_label(available: Option<bool>) -> &'static str {
    if available == Some(true) {
        AVAILABILITY_ACTIVE
    } else {
        AVAILABILITY_OOS
    }
}

fn availability_flag(availability: &str) -> i64 {
    i64::from(availability == AVAILABILITY_ACTIVE)
}

/// `YYYY-MM-DD` part of an ISO-8601 timestamp
fn date_portion(timestamp: &str) -> String {
    timestamp
        .trim()
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string()
}
