//! Company list loading
//!
//! The list is a JSON array of `{name, start_url, platform_type?,
//! storage_condition?}` objects.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{Company, CrawlError, CrawlResult};

/// Parse and validate a company list
pub fn parse_companies(json: &str) -> CrawlResult<Vec<Company>> {
    let companies: Vec<Company> = serde_json::from_str(json)
        .map_err(|e| CrawlError::configuration(format!("Invalid company list: {e}")))?;

    let mut seen = HashSet::new();
    for (index, company) in companies.iter().enumerate() {
        if company.name.trim().is_empty() {
            return Err(CrawlError::configuration(format!(
                "Company #{index} has an empty name"
            )));
        }
        if company.start_url.trim().is_empty() {
            return Err(CrawlError::configuration(format!(
                "Company '{}' has an empty start_url",
                company.name
            )));
        }
        if !seen.insert(company.name.trim().to_lowercase()) {
            warn!(company = %company.name, "Company listed more than once");
        }
    }

    Ok(companies)
}

/// Read a company list file
pub fn load_companies(path: &Path) -> CrawlResult<Vec<Company>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CrawlError::configuration(format!("Cannot read company list {}: {e}", path.display()))
    })?;
    let companies = parse_companies(&json)?;
    info!(count = companies.len(), path = %path.display(), "Company list loaded");
    Ok(companies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_companies() {
        let json = r#"[
            {"name": "GoodDot", "start_url": "gooddot.in", "platform_type": "shopify"},
            {"name": "Blue Tribe", "start_url": "https://bluetribefoods.com", "storage_condition": "Frozen"}
        ]"#;
        let companies = parse_companies(json).unwrap();

        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].platform_type.as_deref(), Some("shopify"));
        assert_eq!(companies[0].base_url(), "https://gooddot.in");
        assert_eq!(companies[1].platform_type, None);
        assert_eq!(companies[1].storage_condition(), "Frozen");
    }

    #[test]
    fn test_invalid_lists_are_configuration_errors() {
        assert_eq!(parse_companies("{}").unwrap_err().kind(), "configuration");
        assert_eq!(
            parse_companies(r#"[{"name": " ", "start_url": "a.test"}]"#).unwrap_err().kind(),
            "configuration"
        );
        assert_eq!(
            parse_companies(r#"[{"name": "A", "start_url": ""}]"#).unwrap_err().kind(),
            "configuration"
        );
    }

    #[test]
    fn test_empty_list_parses() {
        assert!(parse_companies("[]").unwrap().is_empty());
    }

    #[test]
    fn test_load_companies_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "A", "start_url": "a.test"}}]"#).unwrap();

        let companies = load_companies(file.path()).unwrap();
        assert_eq!(companies[0].name, "A");
        assert!(load_companies(Path::new("/nonexistent/companies.json")).is_err());
    }
}
