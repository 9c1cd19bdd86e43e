//! Crawl use case
//!
//! Wires configuration into a ready-to-run orchestrator: database, store,
//! HTTP client and the default extractor registry.

use tracing::info;

use crate::crawling::{CrawlOrchestrator, CrawlProgress, CrawlSummary};
use crate::domain::{Company, CrawlResult};
use crate::extraction::{ExtractionContext, ScraperRegistry};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::{DatabaseConnection, HttpClient, ProductStore};

pub struct CrawlService {
    orchestrator: CrawlOrchestrator,
    store: ProductStore,
}

impl CrawlService {
    pub async fn from_config(config: &AppConfig) -> CrawlResult<Self> {
        Self::with_registry(config, ScraperRegistry::with_defaults()).await
    }

    pub async fn with_registry(config: &AppConfig, registry: ScraperRegistry) -> CrawlResult<Self> {
        let connection = DatabaseConnection::new(&config.database.url()).await?;
        let store = ProductStore::new(connection.pool().clone()).await?;

        let client = HttpClient::with_config(config.crawl.http_client_config())?;
        let context = ExtractionContext::new(client, &config.crawl);
        info!(extractors = ?registry.tags(), "Crawl service ready");

        let orchestrator = CrawlOrchestrator::new(store.clone(), registry, context)
            .with_max_concurrency(config.crawl.max_concurrency);

        Ok(Self { orchestrator, store })
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    pub fn progress(&self) -> CrawlProgress {
        self.orchestrator.progress()
    }

    pub async fn run(&self, companies: &[Company]) -> CrawlResult<CrawlSummary> {
        self.orchestrator.run(companies).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::DatabaseConfig;

    #[tokio::test]
    async fn test_from_config_opens_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database: DatabaseConfig {
                path: dir.path().join("catalog.db"),
            },
            ..AppConfig::default()
        };

        let service = CrawlService::from_config(&config).await.unwrap();
        assert_eq!(service.store().count().await.unwrap(), 0);
        assert_eq!(service.progress().completed(), 0);
        assert!(service.run(&[]).await.is_err());
    }
}
