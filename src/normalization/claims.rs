//! Marketing and dietary claims

use std::collections::BTreeSet;

use super::text::html_to_text;

/// Phrases recognised as claims when they appear in a product description
pub const CLAIM_VOCABULARY: &[&str] = &[
    "vegan",
    "plant-based",
    "gluten-free",
    "non-gmo",
    "gmo-free",
    "organic",
    "natural",
    "no preservatives",
    "high protein",
    "dairy-free",
    "soy-free",
    "no added sugar",
];

/// Canonical claims list: lowercased, de-duplicated, sorted, `", "` joined
pub fn normalize_claims(raw: &str) -> String {
    raw.split(',')
        .map(|claim| claim.trim().to_lowercase())
        .filter(|claim| !claim.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Vocabulary phrases present in the given plain text
pub fn detect_claims(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    CLAIM_VOCABULARY
        .iter()
        .filter(|claim| lower.contains(*claim))
        .map(|claim| (*claim).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Claims found in an HTML description, already in canonical form
pub fn claims_from_description(html: &str) -> String {
    normalize_claims(&detect_claims(&html_to_text(html)).join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_claims_is_order_insensitive() {
        assert_eq!(normalize_claims("vegan, Organic"), normalize_claims("organic, Vegan"));
        assert_eq!(normalize_claims("vegan, Organic"), "organic, vegan");
    }

    #[test]
    fn test_normalize_claims_drops_empties_and_duplicates() {
        assert_eq!(normalize_claims(" vegan,, VEGAN , high protein,"), "high protein, vegan");
        assert_eq!(normalize_claims(""), "");
    }

    #[test]
    fn test_normalize_claims_is_idempotent() {
        let once = normalize_claims("Soy-free, vegan, Natural");
        assert_eq!(normalize_claims(&once), once);
    }

    #[test]
    fn test_detect_claims_from_vocabulary() {
        let found = detect_claims("100% VEGAN and Gluten-Free. Vegan goodness, no preservatives!");
        assert_eq!(found, vec!["gluten-free", "no preservatives", "vegan"]);
    }

    #[test]
    fn test_claims_from_description_strips_markup() {
        let html = "<p><strong>High Protein</strong> plant-based nuggets</p>";
        assert_eq!(claims_from_description(html), "high protein, plant-based");
    }
}
