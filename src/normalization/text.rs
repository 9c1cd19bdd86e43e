//! Markup stripping shared by the description-based extractors

use scraper::Html;

/// Plain text of an HTML fragment: text nodes trimmed and joined by a single
/// space. Plain-text input comes back with its whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
