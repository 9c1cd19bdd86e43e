//! Target company configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_CONDITION: &str = "Ambient";

/// One competitor brand whose storefront gets crawled.
///
/// `platform_type` is a free-form tag so that the company list can name
/// platforms no extractor exists for yet; those fail at registry lookup
/// instead of at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<String>,
    pub start_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_condition: Option<String>,
}

impl Company {
    pub fn new(name: &str, start_url: &str) -> Self {
        Self {
            name: name.to_string(),
            platform_type: None,
            start_url: start_url.to_string(),
            storage_condition: None,
        }
    }

    pub fn with_platform(mut self, platform_type: &str) -> Self {
        self.platform_type = Some(platform_type.to_string());
        self
    }

    pub fn with_storage_condition(mut self, condition: &str) -> Self {
        self.storage_condition = Some(condition.to_string());
        self
    }

    /// Storefront root without a trailing slash, with `https://` added when
    /// the configured URL has no scheme
    pub fn base_url(&self) -> String {
        normalize_scheme(&self.start_url)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn storage_condition(&self) -> &str {
        self.storage_condition
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_STORAGE_CONDITION)
    }
}

/// Prefix `https://` to URLs that carry no scheme
pub fn normalize_scheme(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    }
}
