//! Crawling module
//!
//! Fans a company list out onto a bounded worker pool and reports how each
//! company fared.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::CrawlOrchestrator;
pub use summary::{CompanyOutcome, CrawlProgress, CrawlSummary};
