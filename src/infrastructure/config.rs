//! Configuration management
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional `catalog-crawler.toml` / `.json` file, then environment variables
//! such as `CATALOG_CRAWLER__CRAWL__MAX_CONCURRENCY=8`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::http_client::HttpClientConfig;

/// Default configuration values
pub mod defaults {
    /// Config file looked up in the working directory, without extension
    pub const CONFIG_FILE_STEM: &str = "catalog-crawler";

    /// Environment variable prefix and nesting separator
    pub const ENV_PREFIX: &str = "CATALOG_CRAWLER";
    pub const ENV_SEPARATOR: &str = "__";

    /// Concurrent company crawls
    pub const MAX_CONCURRENCY: usize = 5;

    /// Per-request timeout, a timed out fetch is not retried
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Products requested per catalog listing page
    pub const CATALOG_PAGE_SIZE: u32 = 250;

    /// Upper bound on listing pages per company
    pub const MAX_CATALOG_PAGES: u32 = 20;

    pub const DATABASE_FILE: &str = "catalog.db";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_NAME: &str = "catalog-crawler.log";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawl: CrawlConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_concurrency: usize,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub catalog_page_size: u32,
    pub max_catalog_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::MAX_CONCURRENCY,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            catalog_page_size: defaults::CATALOG_PAGE_SIZE,
            max_catalog_pages: defaults::MAX_CATALOG_PAGES,
        }
    }
}

impl CrawlConfig {
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_seconds: self.request_timeout_seconds,
            user_agent: self.user_agent.clone(),
            ..HttpClientConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding the `products` table
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "error", "warn", "info", "debug" or "trace"
    pub level: String,
    pub json_format: bool,
    pub console_output: bool,
    pub file_output: bool,
    /// Defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, reading `path` when given and otherwise the
    /// optional config file in the working directory.
    ///
    /// The result is not validated; call [`AppConfig::validate`] once any
    /// command-line overrides have been applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(defaults::CONFIG_FILE_STEM).required(false),
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .separator(defaults::ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawl.max_concurrency == 0 {
            return Err(ConfigError::Validation {
                message: "crawl.max_concurrency must be at least 1".to_string(),
            });
        }

        if self.crawl.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "crawl.request_timeout_seconds must be at least 1".to_string(),
            });
        }

        if self.crawl.catalog_page_size == 0 || self.crawl.max_catalog_pages == 0 {
            return Err(ConfigError::Validation {
                message: "crawl.catalog_page_size and crawl.max_catalog_pages must be at least 1"
                    .to_string(),
            });
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                message: "database.path must not be empty".to_string(),
            });
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::Validation {
                message: "logging needs console_output or file_output".to_string(),
            });
        }

        Ok(())
    }
}

/// `<data dir>/catalog-crawler/catalog.db`, or the working directory when the
/// platform has no data dir
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("catalog-crawler"))
        .unwrap_or_default()
        .join(defaults::DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crawl.max_concurrency, 5);
        assert_eq!(config.crawl.request_timeout_seconds, 10);
        assert!(config.database.path.ends_with(defaults::DATABASE_FILE));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = toml_file();
        writeln!(
            file,
            "[crawl]\nmax_concurrency = 2\ncatalog_page_size = 50\n\n[database]\npath = \"/tmp/x.db\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.crawl.max_concurrency, 2);
        assert_eq!(config.crawl.catalog_page_size, 50);
        assert_eq!(config.crawl.request_timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let mut file = toml_file();
        writeln!(file, "[crawl]\nmax_concurrency = 0").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_override_after_load_repairs_invalid_file_value() {
        let mut file = toml_file();
        writeln!(file, "[crawl]\nmax_concurrency = 0").unwrap();

        let mut config = AppConfig::load(Some(file.path())).unwrap();
        config.crawl.max_concurrency = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/catalog-crawler.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig {
            path: PathBuf::from("/data/catalog.db"),
        };
        assert_eq!(config.url(), "sqlite:/data/catalog.db");
    }
}
