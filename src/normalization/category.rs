//! Category inference from product titles
//!
//! Rules are checked top to bottom and the first rule with a matching keyword
//! decides. Keywords match at the start of a word, so `egg` matches "eggs"
//! but not "veggie".

pub const NOT_APPLICABLE: &str = "n/a";

const SEGMENT_MEAT: &str = "PBM";
const SEGMENT_EGG: &str = "PBE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleOutcome {
    Tracked {
        segment: &'static str,
        animal: &'static str,
    },
    Untracked,
}

struct CategoryRule {
    keywords: &'static [&'static str],
    outcome: RuleOutcome,
}

const fn tracked(
    keywords: &'static [&'static str],
    segment: &'static str,
    animal: &'static str,
) -> CategoryRule {
    CategoryRule {
        keywords,
        outcome: RuleOutcome::Tracked { segment, animal },
    }
}

const fn untracked(keywords: &'static [&'static str]) -> CategoryRule {
    CategoryRule {
        keywords,
        outcome: RuleOutcome::Untracked,
    }
}

const CATEGORY_RULES: &[CategoryRule] = &[
    tracked(&["egg", "bhurji"], SEGMENT_EGG, "Egg"),
    tracked(&["unmutton", "mutton"], SEGMENT_MEAT, "Mutton"),
    tracked(&["vegicken", "chicken"], SEGMENT_MEAT, "Chicken"),
    tracked(&["tikka"], SEGMENT_MEAT, "Chicken"),
    tracked(&["sausage"], SEGMENT_MEAT, "Pork"),
    tracked(&["kebab"], SEGMENT_MEAT, "Mutton"),
    tracked(&["momo"], SEGMENT_MEAT, "Chicken"),
    untracked(&["biryani", "noodles", "halwa", "fries"]),
    tracked(&["soya chaap"], SEGMENT_MEAT, "Meat"),
    tracked(
        &[
            "keema", "seekh", "nugget", "burger", "patty", "patties", "salami", "pepperoni",
            "bacon", "shawarma", "meat",
        ],
        SEGMENT_MEAT,
        "Meat",
    ),
];

const POSITIONING_RULES: &[(&[&str], &str)] =
    &[(&["high protein"], "High protein vegetarian product")];
const DEFAULT_POSITIONING: &str = "Plant-based";

const FORMAT_RULES: &[(&[&str], &str)] = &[
    (&["ready to eat", "heat and eat", "heat & eat"], "RTE"),
    (&["ready to cook"], "RTC"),
];
const DEFAULT_FORMAT: &str = "RTC";

/// Inferred classification of one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInference {
    pub category: &'static str,
    pub segment: &'static str,
    pub animal_product_replicated: &'static str,
    pub positioning: &'static str,
    pub consumption_format: &'static str,
}

impl CategoryInference {
    pub fn not_applicable() -> Self {
        Self {
            category: NOT_APPLICABLE,
            segment: NOT_APPLICABLE,
            animal_product_replicated: NOT_APPLICABLE,
            positioning: NOT_APPLICABLE,
            consumption_format: NOT_APPLICABLE,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.segment != NOT_APPLICABLE
    }
}

/// Classify a product title; untracked titles come back as not-applicable
pub fn infer_category(title: &str) -> CategoryInference {
    let text = title.to_lowercase();

    let outcome = CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| contains_word(&text, kw)))
        .map_or(RuleOutcome::Untracked, |rule| rule.outcome);

    let RuleOutcome::Tracked { segment, animal } = outcome else {
        return CategoryInference::not_applicable();
    };

    CategoryInference {
        category: category_label(segment),
        segment,
        animal_product_replicated: animal,
        positioning: first_match(&text, POSITIONING_RULES).unwrap_or(DEFAULT_POSITIONING),
        consumption_format: first_match(&text, FORMAT_RULES).unwrap_or(DEFAULT_FORMAT),
    }
}

fn category_label(segment: &str) -> &'static str {
    match segment {
        SEGMENT_EGG => "Plant-based egg",
        _ => "Plant-based meat",
    }
}

fn first_match(text: &str, rules: &[(&[&str], &'static str)]) -> Option<&'static str> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| contains_word(text, kw)))
        .map(|(_, label)| *label)
}

/// True when `needle` occurs in `haystack` starting at a word boundary
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}
