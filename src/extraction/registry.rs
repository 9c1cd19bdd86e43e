//! Extractor trait and the platform registry
//!
//! Extractors are registered explicitly by platform tag. A company whose tag
//! has no registration fails with a configuration error before any request is
//! made for it.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::json_catalog::JsonCatalogExtractor;
use crate::domain::{Company, CrawlError, CrawlResult, PlatformType, RawRecord};
use crate::infrastructure::config::CrawlConfig;
use crate::infrastructure::http_client::HttpClient;

/// Turns one company's storefront into raw product records.
///
/// `extract` consumes the extractor, so a record stream can be produced
/// only once.
#[async_trait]
pub trait Extractor: Send {
    fn platform(&self) -> PlatformType;

    /// Begin the crawl. Errors here fail the whole company; once a stream is
    /// returned, later faults end it early instead.
    async fn extract(self: Box<Self>) -> CrawlResult<BoxStream<'static, RawRecord>>;
}

/// Shared resources handed to every extractor constructor
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub client: HttpClient,
    pub catalog_page_size: u32,
    pub max_catalog_pages: u32,
}

impl ExtractionContext {
    pub fn new(client: HttpClient, crawl: &CrawlConfig) -> Self {
        Self {
            client,
            catalog_page_size: crawl.catalog_page_size,
            max_catalog_pages: crawl.max_catalog_pages,
        }
    }
}

pub type ExtractorFactory = fn(&Company, &ExtractionContext) -> Box<dyn Extractor>;

#[derive(Clone, Default)]
pub struct ScraperRegistry {
    factories: HashMap<String, ExtractorFactory>,
}

impl ScraperRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in extractor
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PlatformType::Shopify.as_str(), JsonCatalogExtractor::boxed);
        registry
    }

    /// Register (or replace) the constructor for a platform tag
    pub fn register(&mut self, tag: &str, factory: ExtractorFactory) {
        self.factories.insert(normalize_tag(tag), factory);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(&normalize_tag(tag))
    }

    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<_> = self.factories.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Construct the extractor registered for `tag`
    pub fn create(
        &self,
        tag: &str,
        company: &Company,
        context: &ExtractionContext,
    ) -> CrawlResult<Box<dyn Extractor>> {
        let factory = self.factories.get(&normalize_tag(tag)).ok_or_else(|| {
            CrawlError::configuration(format!(
                "No extractor registered for platform '{tag}' (company '{}')",
                company.name
            ))
        })?;
        Ok(factory(company, context))
    }
}

impl fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct FixedExtractor {
        brand: String,
    }

    #[async_trait]
    impl Extractor for FixedExtractor {
        fn platform(&self) -> PlatformType {
            PlatformType::Custom
        }

        async fn extract(self: Box<Self>) -> CrawlResult<BoxStream<'static, RawRecord>> {
            let record = RawRecord::new(PlatformType::Custom, &self.brand, "https://x.test");
            Ok(futures::stream::iter(vec![record]).boxed())
        }
    }

    fn fixed_factory(company: &Company, _context: &ExtractionContext) -> Box<dyn Extractor> {
        Box::new(FixedExtractor {
            brand: company.name.clone(),
        })
    }

    fn context() -> ExtractionContext {
        ExtractionContext::new(HttpClient::new().unwrap(), &CrawlConfig::default())
    }

    #[test]
    fn test_defaults_register_shopify() {
        let registry = ScraperRegistry::with_defaults();
        assert!(registry.is_registered("shopify"));
        assert!(registry.is_registered(" Shopify "));
        assert_eq!(registry.tags(), vec!["shopify"]);
    }

    #[test]
    fn test_unregistered_tag_is_configuration_error() {
        let registry = ScraperRegistry::with_defaults();
        let company = Company::new("Acme", "acme.test").with_platform("wix");

        let err = registry.create("wix", &company, &context()).err().unwrap();
        assert_eq!(err.kind(), "configuration");
        assert!(err.to_string().contains("Acme"));
    }

    #[tokio::test]
    async fn test_registered_factory_builds_extractor() {
        let mut registry = ScraperRegistry::new();
        registry.register("custom", fixed_factory);

        let company = Company::new("Acme", "acme.test");
        let extractor = registry.create("CUSTOM", &company, &context()).unwrap();
        assert_eq!(extractor.platform(), PlatformType::Custom);

        let records: Vec<RawRecord> = extractor.extract().await.unwrap().collect().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].brand, "Acme");
    }
}
