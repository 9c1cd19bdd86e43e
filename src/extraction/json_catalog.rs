//! JSON catalog extractor for Shopify storefronts
//!
//! Reads the public `/products.json` listing page by page and emits one raw
//! record per purchasable variant. The first page is fetched when the crawl
//! begins; later pages are fetched as the record stream is polled.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::registry::{ExtractionContext, Extractor};
use crate::domain::{Company, CrawlError, CrawlResult, PlatformType, RawRecord};
use crate::infrastructure::http_client::HttpClient;
use crate::normalization::infer_category;

const DUPLICATE_MARKER: &str = "(copy)";
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

static GRAMS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*g\b").expect("grams pattern must compile"));

#[derive(Debug, Deserialize)]
struct CatalogProduct {
    title: String,
    handle: String,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    variants: Vec<CatalogVariant>,
    #[serde(default)]
    images: Vec<CatalogImage>,
}

#[derive(Debug, Deserialize)]
struct CatalogVariant {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    available: Option<bool>,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    grams: Option<f64>,
    #[serde(default)]
    sku: Value,
}

#[derive(Debug, Deserialize)]
struct CatalogImage {
    src: String,
}

pub struct JsonCatalogExtractor {
    company: Company,
    client: HttpClient,
    page_size: u32,
    max_pages: u32,
}

impl JsonCatalogExtractor {
    pub fn new(company: Company, context: &ExtractionContext) -> Self {
        Self {
            company,
            client: context.client.clone(),
            page_size: context.catalog_page_size.max(1),
            max_pages: context.max_catalog_pages.max(1),
        }
    }

    /// Constructor registered with the `ScraperRegistry`
    pub fn boxed(company: &Company, context: &ExtractionContext) -> Box<dyn Extractor> {
        Box::new(Self::new(company.clone(), context))
    }
}

#[async_trait]
impl Extractor for JsonCatalogExtractor {
    fn platform(&self) -> PlatformType {
        PlatformType::Shopify
    }

    async fn extract(self: Box<Self>) -> CrawlResult<BoxStream<'static, RawRecord>> {
        let mut cursor = CatalogCursor {
            base_url: self.company.base_url(),
            company: self.company,
            client: self.client,
            page_size: self.page_size,
            max_pages: self.max_pages,
            next_page: Some(1),
            seen_handles: HashSet::new(),
        };

        let first_page = cursor.fetch_next_page().await?;
        info!(
            company = %cursor.company.name,
            records = first_page.len(),
            "📦 First catalog page extracted"
        );

        let remaining = stream::unfold(cursor, |mut cursor| async move {
            cursor.next_page?;
            match cursor.fetch_next_page().await {
                Ok(records) => Some((stream::iter(records), cursor)),
                Err(e) => {
                    warn!(company = %cursor.company.name, error = %e, "Catalog listing ended early");
                    None
                }
            }
        })
        .flatten();

        Ok(stream::iter(first_page).chain(remaining).boxed())
    }
}

/// Pagination state carried between listing pages
struct CatalogCursor {
    company: Company,
    base_url: String,
    client: HttpClient,
    page_size: u32,
    max_pages: u32,
    next_page: Option<u32>,
    seen_handles: HashSet<String>,
}

impl CatalogCursor {
    fn page_url(&self, page: u32) -> String {
        format!("{}/products.json?limit={}&page={page}", self.base_url, self.page_size)
    }

    async fn fetch_next_page(&mut self) -> CrawlResult<VecDeque<RawRecord>> {
        let Some(page) = self.next_page else {
            return Ok(VecDeque::new());
        };
        self.next_page = None;

        let url = self.page_url(page);
        let payload: Value = self.client.fetch_json(&url).await?;
        let entries = match payload.get("products") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(CrawlError::parse(&url, "payload has no 'products' array")),
        };

        let full_page = u32::try_from(entries.len()).is_ok_and(|n| n >= self.page_size);
        if full_page && page < self.max_pages {
            self.next_page = Some(page + 1);
        }
        debug!(url = %url, products = entries.len(), "Catalog page fetched");

        let fetched_at = Utc::now();
        let mut records = VecDeque::new();
        for entry in entries {
            let product: CatalogProduct = match serde_json::from_value(entry.clone()) {
                Ok(product) => product,
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping malformed catalog entry");
                    continue;
                }
            };
            if !self.seen_handles.insert(product.handle.clone()) {
                debug!(handle = %product.handle, "Skipping product already listed");
                continue;
            }
            records.extend(self.records_for(&product, fetched_at));
        }

        Ok(records)
    }

    fn records_for(&self, product: &CatalogProduct, fetched_at: chrono::DateTime<Utc>) -> Vec<RawRecord> {
        if product.title.to_lowercase().contains(DUPLICATE_MARKER) {
            debug!(title = %product.title, "Skipping duplicate listing");
            return Vec::new();
        }
        if !infer_category(&product.title).is_tracked() {
            info!(title = %product.title, "Skipping product outside tracked categories");
            return Vec::new();
        }

        let product_url = format!("{}/products/{}", self.base_url, product.handle);
        let multi_variant = product.variants.len() > 1;
        let images: Vec<String> = product.images.iter().map(|img| img.src.clone()).collect();

        product
            .variants
            .iter()
            .map(|variant| {
                let variant_title = variant.title.as_deref().unwrap_or_default().trim();
                let weight = variant
                    .grams
                    .filter(|g| *g > 0.0)
                    .or_else(|| grams_in(variant_title))
                    .or_else(|| grams_in(&product.title));

                let pack_label = if variant_title == DEFAULT_VARIANT_TITLE || variant_title.is_empty() {
                    weight.map(|w| format!("{w}g")).unwrap_or_default()
                } else {
                    variant_title.to_string()
                };

                let product_page = match (multi_variant, variant_id(&variant.id)) {
                    (true, Some(id)) => format!("{product_url}?variant={id}"),
                    _ => product_url.clone(),
                };

                let mut record =
                    RawRecord::new(PlatformType::Shopify, &self.company.name, &self.base_url);
                record.title = product.title.clone();
                record.available = variant.available;
                record.price = variant.price.clone();
                record.weight_grams = weight;
                record.pack_label = pack_label;
                record.sku = variant.sku.clone();
                record.description_html = product.body_html.clone().unwrap_or_default();
                record.updated_at = product.updated_at.clone().unwrap_or_default();
                record.product_page = product_page;
                record.images = images.clone();
                record.storage_condition = self.company.storage_condition().to_string();
                record.fetched_at = fetched_at;
                record
            })
            .collect()
    }
}

fn grams_in(text: &str) -> Option<f64> {
    GRAMS_PATTERN
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|g| *g > 0.0)
}

fn variant_id(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::CrawlConfig;
    use crate::test_utils::StubServer;
    use serde_json::json;

    fn context(page_size: u32) -> ExtractionContext {
        let crawl = CrawlConfig {
            catalog_page_size: page_size,
            ..CrawlConfig::default()
        };
        ExtractionContext::new(HttpClient::new().unwrap(), &crawl)
    }

    fn product(handle: &str, title: &str, variants: Value) -> Value {
        json!({
            "id": 1,
            "title": title,
            "handle": handle,
            "body_html": "<p>Ingredients: soy, wheat</p>",
            "updated_at": "2024-05-01T10:00:00+05:30",
            "variants": variants,
            "images": [{"src": format!("https://cdn.test/{handle}.jpg")}]
        })
    }

    fn single_variant(grams: u32) -> Value {
        json!([{ "id": 11, "title": "Default Title", "available": true, "price": "199.00", "grams": grams, "sku": "sku-1" }])
    }

    async fn extract_all(server: &StubServer, path: &str, page_size: u32) -> CrawlResult<Vec<RawRecord>> {
        let company = Company::new("GoodDot", &server.url(path)).with_storage_condition("Frozen");
        let extractor = JsonCatalogExtractor::boxed(&company, &context(page_size));
        Ok(extractor.extract().await?.collect().await)
    }

    #[tokio::test]
    async fn test_single_variant_products() {
        let body = json!({ "products": [
            product("nuggets", "Vegicken Nuggets", single_variant(250)),
            product("nuggets-copy", "Vegicken Nuggets (Copy)", single_variant(250)),
            product("gift-card", "Gift Card", single_variant(0)),
        ]});
        let server = StubServer::start(vec![("/shop/products.json", 200, body.to_string())]).await;

        let records = extract_all(&server, "/shop", 250).await.unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title, "Vegicken Nuggets");
        assert_eq!(record.brand, "GoodDot");
        assert_eq!(record.product_page, server.url("/shop/products/nuggets"));
        assert_eq!(record.weight_grams, Some(250.0));
        assert_eq!(record.pack_label, "250g");
        assert_eq!(record.available, Some(true));
        assert_eq!(record.price, json!("199.00"));
        assert_eq!(record.storage_condition, "Frozen");
        assert_eq!(record.images, vec!["https://cdn.test/nuggets.jpg"]);
    }

    #[tokio::test]
    async fn test_multi_variant_product_keys_by_variant() {
        let variants = json!([
            { "id": 21, "title": "Pack of 2", "available": true, "price": "350.00", "grams": 0 },
            { "id": 22, "title": "500 g", "available": false, "price": "450.00" }
        ]);
        let body = json!({ "products": [product("keema", "Unmutton Keema (250 g)", variants)] });
        let server = StubServer::start(vec![("/products.json", 200, body.to_string())]).await;

        let records = extract_all(&server, "", 250).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_page, server.url("/products/keema?variant=21"));
        assert_eq!(records[0].pack_label, "Pack of 2");
        assert_eq!(records[0].weight_grams, Some(250.0));
        assert_eq!(records[1].product_page, server.url("/products/keema?variant=22"));
        assert_eq!(records[1].weight_grams, Some(500.0));
        assert_eq!(records[1].available, Some(false));
    }

    #[tokio::test]
    async fn test_pagination_and_duplicate_handles() {
        let page1 = json!({ "products": [
            product("a", "Chicken A", single_variant(100)),
            product("b", "Chicken B", single_variant(100)),
        ]});
        let page2 = json!({ "products": [
            product("b", "Chicken B", single_variant(100)),
            product("c", "Chicken C", single_variant(100)),
        ]});
        let page3 = json!({ "products": [product("d", "Chicken D", single_variant(100))] });
        let server = StubServer::start(vec![
            ("/products.json?limit=2&page=1", 200, page1.to_string()),
            ("/products.json?limit=2&page=2", 200, page2.to_string()),
            ("/products.json?limit=2&page=3", 200, page3.to_string()),
        ])
        .await;

        let records = extract_all(&server, "", 2).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Chicken A", "Chicken B", "Chicken C", "Chicken D"]);
    }

    #[tokio::test]
    async fn test_later_page_failure_ends_stream() {
        let page1 = json!({ "products": [
            product("a", "Chicken A", single_variant(100)),
            product("b", "Chicken B", single_variant(100)),
        ]});
        let server = StubServer::start(vec![
            ("/products.json?limit=2&page=1", 200, page1.to_string()),
            ("/products.json?limit=2&page=2", 503, "unavailable".to_string()),
        ])
        .await;

        let records = extract_all(&server, "", 2).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_parse_error() {
        let server = StubServer::start(vec![("/products.json", 200, r#"{"items": []}"#.to_string())]).await;
        let err = extract_all(&server, "", 250).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_malformed_entry_is_skipped() {
        let body = json!({ "products": [
            { "title": "Chicken without handle" },
            product("ok", "Chicken OK", single_variant(100)),
        ]});
        let server = StubServer::start(vec![("/products.json", 200, body.to_string())]).await;

        let records = extract_all(&server, "", 250).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Chicken OK");
    }

    #[test]
    fn test_grams_in_labels() {
        assert_eq!(grams_in("Tikka (250 g)"), Some(250.0));
        assert_eq!(grams_in("Pack 400G"), Some(400.0));
        assert_eq!(grams_in("1 kg"), None);
        assert_eq!(grams_in("Spicy"), None);
    }
}
