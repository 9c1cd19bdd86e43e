//! Canonical product schema
//!
//! `CANONICAL_SCHEMA` is the single source of truth for the persisted table:
//! column names, their SQLite storage class and their order. The store builds
//! and migrates its table from it and filters incoming field maps against it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary key column, the canonical product (variant) URL
pub const PRIMARY_KEY: &str = "product_page";

/// Ordered field map, the shape records take at the store boundary
pub type FieldMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
}

impl FieldKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Integer => "INTEGER",
            FieldKind::Real => "REAL",
        }
    }
}

pub const CANONICAL_SCHEMA: &[(&str, FieldKind)] = &[
    ("product_page", FieldKind::Text),
    ("title", FieldKind::Text),
    ("brand", FieldKind::Text),
    ("category", FieldKind::Text),
    ("subcategory", FieldKind::Text),
    ("segment", FieldKind::Text),
    ("animal_product_replicated", FieldKind::Text),
    ("positioning", FieldKind::Text),
    ("consumption_format", FieldKind::Text),
    ("product_format", FieldKind::Text),
    ("storage_condition", FieldKind::Text),
    ("status", FieldKind::Text),
    ("availability", FieldKind::Text),
    ("in_stock", FieldKind::Integer),
    ("launch_date", FieldKind::Text),
    ("last_updated", FieldKind::Text),
    ("price_inr", FieldKind::Real),
    ("unit_price", FieldKind::Real),
    ("price_per_kg_l", FieldKind::Real),
    ("weight", FieldKind::Real),
    ("weight_unit", FieldKind::Text),
    ("pack_size", FieldKind::Text),
    ("shelf_life", FieldKind::Text),
    ("type_of_manufacturing", FieldKind::Text),
    ("ingredients_list", FieldKind::Text),
    ("ingredient_count", FieldKind::Integer),
    ("protein_sources", FieldKind::Text),
    ("allergen_info", FieldKind::Text),
    ("nutritional_claims", FieldKind::Text),
    ("health_claims", FieldKind::Text),
    ("claims", FieldKind::Text),
    ("certifications", FieldKind::Text),
    ("channel", FieldKind::Text),
    ("distribution_channels", FieldKind::Text),
    ("manufactured_by", FieldKind::Text),
    ("marketed_by", FieldKind::Text),
    ("website", FieldKind::Text),
    ("images", FieldKind::Text),
    ("sku_code", FieldKind::Text),
    ("source_name", FieldKind::Text),
    ("source_links", FieldKind::Text),
    ("notes", FieldKind::Text),
    ("scraped_at", FieldKind::Text),
];

/// Storage class of a canonical column, `None` for unknown names
pub fn field_kind(name: &str) -> Option<FieldKind> {
    CANONICAL_SCHEMA
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}

/// Fully normalized product variant, one row of the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub product_page: String,
    pub title: String,
    pub brand: String,
    pub category: String,
    pub subcategory: String,
    pub segment: String,
    pub animal_product_replicated: String,
    pub positioning: String,
    pub consumption_format: String,
    pub product_format: String,
    pub storage_condition: String,
    pub status: String,
    pub availability: String,
    pub in_stock: i64,
    pub launch_date: String,
    pub last_updated: String,
    pub price_inr: Option<f64>,
    pub unit_price: Option<f64>,
    pub price_per_kg_l: Option<f64>,
    pub weight: f64,
    pub weight_unit: String,
    pub pack_size: String,
    pub shelf_life: String,
    pub type_of_manufacturing: String,
    pub ingredients_list: String,
    pub ingredient_count: i64,
    pub protein_sources: String,
    pub allergen_info: String,
    pub nutritional_claims: String,
    pub health_claims: String,
    pub claims: String,
    pub certifications: String,
    pub channel: String,
    pub distribution_channels: String,
    pub manufactured_by: String,
    pub marketed_by: String,
    pub website: String,
    pub images: String,
    pub sku_code: String,
    pub source_name: String,
    pub source_links: String,
    pub notes: String,
    pub scraped_at: String,
}

impl CanonicalProduct {
    /// Field map in schema order
    pub fn to_field_map(&self) -> FieldMap {
        let mut source = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let mut ordered = Map::with_capacity(CANONICAL_SCHEMA.len());
        for (name, _) in CANONICAL_SCHEMA {
            if let Some(value) = source.remove(*name) {
                ordered.insert((*name).to_string(), value);
            }
        }
        ordered
    }
}
