//! Crawl error taxonomy
//!
//! The kind decides the blast radius: configuration faults stop a task (or the
//! whole run when the company list is empty), network and parse faults stop a
//! single company, persistence faults drop a single record. A task that
//! panics is reported as aborted for its company alone.

use thiserror::Error;

pub type CrawlResult<T> = Result<T, CrawlError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Crawl task aborted: {0}")]
    TaskAborted(String),
}

impl CrawlError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn network(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(context: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            context: context.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable kind, used in logs and run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Network { .. } => "network",
            Self::Parse { .. } => "parse",
            Self::Persistence(_) => "persistence",
            Self::TaskAborted(_) => "task",
        }
    }
}

impl From<sqlx::Error> for CrawlError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
