//! Extraction layer
//!
//! Per-platform extractors that read a storefront's catalog and emit raw
//! product records, plus the registry that picks one by platform tag.

pub mod json_catalog;
pub mod registry;

pub use json_catalog::JsonCatalogExtractor;
pub use registry::{ExtractionContext, Extractor, ExtractorFactory, ScraperRegistry};
