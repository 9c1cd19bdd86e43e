//! Infrastructure layer for HTTP, persistence, configuration and logging
//!
//! Everything that talks to the outside world lives here: the shared HTTP
//! client, platform detection, the SQLite-backed product store, and the
//! configuration and logging setup used by the binary.

pub mod config;
pub mod database_connection;
pub mod http_client;
pub mod logging;
pub mod platform_detector;
pub mod product_store;

pub use config::{AppConfig, ConfigError};
pub use database_connection::DatabaseConnection;
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use platform_detector::PlatformDetector;
pub use product_store::{ProductStore, RejectReason, UpsertOutcome};
