//! Application layer
//!
//! Use cases that the binary (and integration tests) drive: loading the
//! company list and running a configured crawl.

pub mod company_list;
pub mod crawl_service;

pub use company_list::{load_companies, parse_companies};
pub use crawl_service::CrawlService;
