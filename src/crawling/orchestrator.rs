//! # Crawl Orchestrator
//!
//! Runs one task per company on the tokio runtime, gated by a semaphore.
//! Each task resolves the platform, builds the extractor and pipes every raw
//! record through the normalization engine into the product store. A failing
//! or panicking task only affects its own company.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use super::summary::{CompanyOutcome, CrawlProgress, CrawlSummary};
use crate::domain::{Company, CrawlError, CrawlResult};
use crate::extraction::{ExtractionContext, ScraperRegistry};
use crate::infrastructure::config::defaults;
use crate::infrastructure::platform_detector::PlatformDetector;
use crate::infrastructure::product_store::{ProductStore, UpsertOutcome};
use crate::normalization::NormalizationEngine;

/// Everything a company task needs, shared across tasks
struct CrawlPipeline {
    registry: ScraperRegistry,
    detector: PlatformDetector,
    engine: NormalizationEngine,
    store: ProductStore,
    context: ExtractionContext,
}

pub struct CrawlOrchestrator {
    pipeline: Arc<CrawlPipeline>,
    max_concurrency: usize,
    progress: CrawlProgress,
}

impl CrawlOrchestrator {
    pub fn new(store: ProductStore, registry: ScraperRegistry, context: ExtractionContext) -> Self {
        let detector = PlatformDetector::new(context.client.clone());
        Self {
            pipeline: Arc::new(CrawlPipeline {
                registry,
                detector,
                engine: NormalizationEngine::new(),
                store,
                context,
            }),
            max_concurrency: defaults::MAX_CONCURRENCY,
            progress: CrawlProgress::default(),
        }
    }

    /// Concurrency ceiling, at least one
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Handle for observing the completed-task counter from elsewhere
    pub fn progress(&self) -> CrawlProgress {
        self.progress.clone()
    }

    /// Crawl every company and wait for all tasks to finish
    pub async fn run(&self, companies: &[Company]) -> CrawlResult<CrawlSummary> {
        if companies.is_empty() {
            return Err(CrawlError::configuration("No companies configured"));
        }

        let started_at = Utc::now();
        let total = companies.len();
        self.progress.start(total);
        info!(companies = total, max_concurrency = self.max_concurrency, "🚀 Starting crawl");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut running = companies
            .iter()
            .enumerate()
            .map(|(index, company)| {
                let pipeline = Arc::clone(&self.pipeline);
                let semaphore = Arc::clone(&semaphore);
                let task_company = company.clone();
                let handle = tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return CompanyOutcome::failed(
                            &task_company.name,
                            CrawlError::TaskAborted("worker pool closed".to_string()),
                        );
                    };
                    pipeline.crawl_company(&task_company).await
                });
                async move { (index, company.name.clone(), handle.await) }
            })
            .collect::<FuturesUnordered<_>>();

        let mut outcomes: Vec<Option<CompanyOutcome>> = vec![None; total];
        while let Some((index, name, joined)) = running.next().await {
            let outcome = joined.unwrap_or_else(|join_error| {
                error!(company = %name, error = %join_error, "💥 Crawl task panicked");
                CompanyOutcome::failed(&name, CrawlError::TaskAborted(join_error.to_string()))
            });
            let completed = self.progress.mark_finished();
            info!(
                company = %name,
                success = outcome.is_success(),
                persisted = outcome.records_persisted,
                "Company finished ({completed}/{total})"
            );
            outcomes[index] = Some(outcome);
        }

        let summary = CrawlSummary {
            outcomes: outcomes.into_iter().flatten().collect(),
            started_at,
            finished_at: Utc::now(),
        };

        if summary.is_partial() {
            warn!(failed = summary.failed(), succeeded = summary.succeeded(), "Crawl finished with failures");
        } else {
            info!(records = summary.records_persisted(), "✅ Crawl finished");
        }

        Ok(summary)
    }
}

impl CrawlPipeline {
    async fn crawl_company(&self, company: &Company) -> CompanyOutcome {
        let mut outcome = CompanyOutcome::new(&company.name);
        if let Err(e) = self.drive(company, &mut outcome).await {
            error!(company = %company.name, kind = e.kind(), error = %e, "❌ Company crawl failed");
            outcome.error = Some(e);
        }
        outcome
    }

    async fn drive(&self, company: &Company, outcome: &mut CompanyOutcome) -> CrawlResult<()> {
        let tag = match company.platform_type.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag.to_string(),
            _ => self.detector.detect(&company.start_url).await?.as_str().to_string(),
        };
        outcome.platform = Some(tag.clone());

        let extractor = self.registry.create(&tag, company, &self.context)?;
        let mut records = extractor.extract().await?;

        while let Some(raw) = records.next().await {
            let product = self.engine.normalize(&raw);
            match self.store.upsert_product(&product).await {
                Ok(UpsertOutcome::Written { .. }) => outcome.records_persisted += 1,
                Ok(UpsertOutcome::Rejected(reason)) => {
                    debug!(company = %company.name, ?reason, "Record rejected by store");
                    outcome.records_rejected += 1;
                }
                Err(e) => {
                    error!(company = %company.name, page = %product.product_page, error = %e, "Failed to persist record");
                    outcome.records_failed += 1;
                }
            }
        }

        Ok(())
    }
}
