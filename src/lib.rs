//! Catalog Crawler - storefront product catalog collection
//!
//! Classifies competitor storefronts by commerce platform, extracts their
//! product catalogs, normalizes every variant into one canonical schema and
//! keeps the result in a keyed SQLite table.

pub mod application;
pub mod crawling;
pub mod domain;
pub mod extraction;
pub mod infrastructure;
pub mod normalization;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use application::CrawlService;
pub use crawling::{CrawlOrchestrator, CrawlProgress, CrawlSummary};
pub use domain::{CanonicalProduct, Company, CrawlError, CrawlResult, PlatformType, RawRecord};
pub use extraction::{Extractor, ScraperRegistry};
pub use infrastructure::{AppConfig, PlatformDetector, ProductStore};
pub use normalization::NormalizationEngine;
