//! Ingredient list extraction from product descriptions

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::html_to_text;

static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(ingredients|made from|made with)\s*[:\-]?\s*([\w\s,()\[\]\.\-]+)")
        .expect("ingredient section pattern must compile")
});

static CONTAINS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\.?\s*contains.*").expect("contains clause pattern must compile")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    pub items: Vec<String>,
}

impl IngredientList {
    /// Items joined by `", "`
    pub fn joined(&self) -> String {
        self.items.join(", ")
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Ingredients declared in an HTML description; empty when no section exists
pub fn extract_ingredients(html: &str) -> IngredientList {
    let text = html_to_text(html);
    let Some(caps) = SECTION_PATTERN.captures(&text) else {
        return IngredientList::default();
    };

    let section = CONTAINS_PATTERN.replace(&caps[2], "");
    let items = section
        .split(',')
        .map(|item| item.trim().trim_end_matches('.').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    IngredientList { items }
}
