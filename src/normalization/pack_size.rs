//! Pack size canonicalization
//!
//! Every pack label ends up in one of four shapes: `"<n> <unit>"`,
//! `"<n> pack"`, `"<n> count"`, or the trimmed original text.

use once_cell::sync::Lazy;
use regex::Regex;

static MEASURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(kg|ml|g|l)\b").expect("measure pattern must compile")
});

static PACK_OF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pack of (\d+)").expect("pack-of pattern must compile"));

static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("count pattern must compile"));

/// Canonical pack size, first matching shape wins
pub fn normalize_pack_size(raw: &str) -> String {
    let lower = raw.to_lowercase();

    if let Some(caps) = MEASURE_PATTERN.captures(&lower) {
        return format!("{} {}", &caps[1], &caps[2]);
    }
    if let Some(caps) = PACK_OF_PATTERN.captures(&lower) {
        return format!("{} pack", &caps[1]);
    }
    if let Some(caps) = COUNT_PATTERN.captures(&lower) {
        return format!("{} count", &caps[1]);
    }

    raw.trim().to_string()
}

/// Grams (or millilitres) described by a pack label, if it carries a measure
pub fn grams_from_pack_size(raw: &str) -> Option<f64> {
    let lower = raw.to_lowercase();
    let caps = MEASURE_PATTERN.captures(&lower)?;
    let value: f64 = caps[1].parse().ok()?;
    let factor = match &caps[2] {
        "kg" | "l" => 1000.0,
        _ => 1.0,
    };
    let grams = value * factor;
    (grams > 0.0).then_some(grams)
}

/// Multiplier of `"<n> pack"` / `"<n> count"` shapes
pub fn pack_count(normalized: &str) -> Option<u32> {
    let (count, shape) = normalized.split_once(' ')?;
    match shape {
        "pack" | "count" => count.parse().ok().filter(|n| *n > 0),
        _ => None,
    }
}
