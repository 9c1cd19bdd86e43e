//! Storefront platform detection
//!
//! One GET of the storefront home page, then an ordered table of marker rules.
//! The first rule with any matching marker names the platform; a page that
//! matches nothing is `custom`.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::http_client::HttpClient;
use crate::domain::company::normalize_scheme;
use crate::domain::{CrawlResult, PlatformType};

/// Tag reported by `detect_tag` when the storefront could not be fetched
pub const DETECTION_ERROR_TAG: &str = "error";

#[derive(Debug, Clone, Copy)]
enum Marker {
    /// Substring of the raw page source
    Content(&'static str),
    /// Substring of a `<meta name="generator">` content, case-insensitive
    Generator(&'static str),
    /// Exact class on `<body>`
    BodyClass(&'static str),
    /// Exact `type` attribute of a `<script>`
    ScriptType(&'static str),
    /// Suffix of the storefront host name
    HostSuffix(&'static str),
}

struct DetectionRule {
    platform: PlatformType,
    markers: &'static [Marker],
}

const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        platform: PlatformType::Shopify,
        markers: &[Marker::Content("cdn.shopify.com"), Marker::Content("cdn.shopifycdn.net")],
    },
    DetectionRule {
        platform: PlatformType::Wix,
        markers: &[
            Marker::Content("static.wixstatic.com"),
            Marker::Content("parastorage.com"),
            Marker::Generator("wix.com"),
        ],
    },
    DetectionRule {
        platform: PlatformType::Squarespace,
        markers: &[
            Marker::Content("Static.SQUARESPACE_CONTEXT"),
            Marker::Content("static1.squarespace.com"),
            Marker::Generator("squarespace"),
        ],
    },
    DetectionRule {
        platform: PlatformType::Magento,
        markers: &[Marker::ScriptType("text/x-magento-init")],
    },
    DetectionRule {
        platform: PlatformType::WooCommerce,
        markers: &[
            Marker::BodyClass("woocommerce"),
            Marker::Content("/wp-content/plugins/woocommerce/"),
        ],
    },
    DetectionRule {
        platform: PlatformType::BigCommerce,
        markers: &[
            Marker::Content("BCData"),
            Marker::Content("cdn11.bigcommerce.com"),
            Marker::HostSuffix(".mybigcommerce.com"),
        ],
    },
];

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("meta selector must parse"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector must parse"));
static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type]").expect("script selector must parse"));

/// Facts pulled from one page, checked against the rule table
struct PageSignals<'a> {
    source: &'a str,
    host: String,
    generators: Vec<String>,
    body_classes: Vec<String>,
    script_types: Vec<String>,
}

impl<'a> PageSignals<'a> {
    fn collect(url: &str, source: &'a str) -> Self {
        let document = Html::parse_document(source);

        let generators = document
            .select(&META_SELECTOR)
            .filter(|meta| {
                meta.value()
                    .attr("name")
                    .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
            })
            .filter_map(|meta| meta.value().attr("content"))
            .map(str::to_lowercase)
            .collect();

        let body_classes = document
            .select(&BODY_SELECTOR)
            .flat_map(|body| body.value().classes().map(str::to_string).collect::<Vec<_>>())
            .collect();

        let script_types = document
            .select(&SCRIPT_SELECTOR)
            .filter_map(|script| script.value().attr("type"))
            .map(|t| t.trim().to_lowercase())
            .collect();

        let host = Url::parse(&normalize_scheme(url))
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        Self {
            source,
            host,
            generators,
            body_classes,
            script_types,
        }
    }

    fn matches(&self, marker: Marker) -> bool {
        match marker {
            Marker::Content(needle) => self.source.contains(needle),
            Marker::Generator(needle) => self.generators.iter().any(|g| g.contains(needle)),
            Marker::BodyClass(class) => self.body_classes.iter().any(|c| c == class),
            Marker::ScriptType(kind) => self.script_types.iter().any(|t| t == kind),
            Marker::HostSuffix(suffix) => self.host.ends_with(suffix),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDetector {
    client: HttpClient,
}

impl PlatformDetector {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Fetch the storefront once and classify it
    pub async fn detect(&self, url: &str) -> CrawlResult<PlatformType> {
        let url = normalize_scheme(url);
        let html = self.client.fetch_text(&url).await?;
        let platform = Self::classify(&url, &html);
        info!(url = %url, platform = %platform, "🔍 Platform detected");
        Ok(platform)
    }

    /// Platform tag, or `"error"` when the storefront could not be fetched
    pub async fn detect_tag(&self, url: &str) -> String {
        match self.detect(url).await {
            Ok(platform) => platform.as_str().to_string(),
            Err(e) => {
                warn!(url, error = %e, "Platform detection failed");
                DETECTION_ERROR_TAG.to_string()
            }
        }
    }

    /// Classify already fetched page source; never fails
    pub fn classify(url: &str, html: &str) -> PlatformType {
        let signals = PageSignals::collect(url, html);
        DETECTION_RULES
            .iter()
            .find(|rule| rule.markers.iter().any(|m| signals.matches(*m)))
            .map_or(PlatformType::Custom, |rule| rule.platform)
    }
}
