//! SKU, price and unit economics helpers

use serde_json::Value;

/// Uppercased, trimmed SKU; anything that is not a string becomes empty
pub fn normalize_sku(raw: &Value) -> String {
    match raw {
        Value::String(sku) => normalize_sku_str(sku),
        _ => String::new(),
    }
}

pub fn normalize_sku_str(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Numeric price from a JSON number or a numeric string such as `"1,299.00"`
pub fn parse_price(raw: &Value) -> Option<f64> {
    let price = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let cleaned: String = text
                .trim()
                .trim_start_matches('₹')
                .trim_start_matches("Rs.")
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    price.is_finite().then_some(price)
}

/// Price per kilogram (or litre), rounded to two decimals
///
/// Undefined when either input is missing, zero or negative.
pub fn price_per_kg_or_l(price: Option<f64>, weight_grams: Option<f64>) -> Option<f64> {
    let price = price.filter(|p| *p > 0.0)?;
    let grams = weight_grams.filter(|w| *w > 0.0)?;
    Some(round2(price / (grams / 1000.0)))
}

/// Price of a single unit inside a multi-unit pack
pub fn unit_price(price: Option<f64>, units: Option<u32>) -> Option<f64> {
    let price = price?;
    match units {
        Some(units) if units > 1 => Some(round2(price / f64::from(units))),
        _ => Some(price),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
