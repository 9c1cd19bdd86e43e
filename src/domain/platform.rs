//! Storefront platform classification tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commerce platform a storefront runs on.
///
/// The string tag (`as_str`) is what the company list carries and what the
/// extractor registry is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Shopify,
    Wix,
    Squarespace,
    Magento,
    WooCommerce,
    BigCommerce,
    Custom,
}

impl PlatformType {
    pub const ALL: [PlatformType; 7] = [
        PlatformType::Shopify,
        PlatformType::Wix,
        PlatformType::Squarespace,
        PlatformType::Magento,
        PlatformType::WooCommerce,
        PlatformType::BigCommerce,
        PlatformType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Shopify => "shopify",
            PlatformType::Wix => "wix",
            PlatformType::Squarespace => "squarespace",
            PlatformType::Magento => "magento",
            PlatformType::WooCommerce => "woocommerce",
            PlatformType::BigCommerce => "bigcommerce",
            PlatformType::Custom => "custom",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == tag)
            .ok_or_else(|| format!("unknown platform tag '{s}'"))
    }
}
