//! Run progress and per-company outcomes

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::domain::CrawlError;

/// Cloneable view of a running crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl CrawlProgress {
    /// Company tasks finished so far, successful or not
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.completed() >= self.total()
    }

    pub(crate) fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Count one more finished task, returning the new count
    pub(crate) fn mark_finished(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyOutcome {
    pub company: String,
    /// Platform tag used for the crawl, if one was resolved
    pub platform: Option<String>,
    pub records_persisted: usize,
    pub records_rejected: usize,
    pub records_failed: usize,
    pub error: Option<CrawlError>,
}

impl CompanyOutcome {
    pub fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            platform: None,
            records_persisted: 0,
            records_rejected: 0,
            records_failed: 0,
            error: None,
        }
    }

    pub fn failed(company: &str, error: CrawlError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(company)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// One outcome per company, in input order
    pub outcomes: Vec<CompanyOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CompanyOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn records_persisted(&self) -> usize {
        self.outcomes.iter().map(|o| o.records_persisted).sum()
    }

    /// True when at least one company failed
    pub fn is_partial(&self) -> bool {
        self.failed() > 0
    }

    pub fn outcome(&self, company: &str) -> Option<&CompanyOutcome> {
        self.outcomes.iter().find(|o| o.company == company)
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(
            f,
            "Crawl finished in {:.1}s: {} companies, {} succeeded, {} failed, {} records persisted",
            elapsed.num_milliseconds() as f64 / 1000.0,
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.records_persisted()
        )?;
        for outcome in &self.outcomes {
            let platform = outcome.platform.as_deref().unwrap_or("-");
            match &outcome.error {
                None => writeln!(
                    f,
                    "  ok     {} [{platform}] persisted={} rejected={} failed={}",
                    outcome.company,
                    outcome.records_persisted,
                    outcome.records_rejected,
                    outcome.records_failed
                )?,
                Some(error) => writeln!(
                    f,
                    "  failed {} [{platform}] {}: {error}",
                    outcome.company,
                    error.kind()
                )?,
            }
        }
        Ok(())
    }
}
