//! Logging system configuration and initialization
//!
//! Console output by default, an optional plain or JSON log file, and an
//! `EnvFilter` that keeps dependency chatter down unless `RUST_LOG` or a
//! trace level asks for it.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::{self, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use super::config::LoggingConfig;

// Keeps the file writer alive for the life of the process
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

const QUIET_DEPENDENCIES: &[&str] = &[
    "sqlx=warn",
    "reqwest=info",
    "hyper=warn",
    "hyper_util=warn",
    "h2=warn",
    "rustls=warn",
    "html5ever=warn",
    "selectors=warn",
];

/// UTC timestamps with millisecond precision
struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ"))
    }
}

/// `logs/` next to the executable, falling back to the working directory
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Filter used when `RUST_LOG` is not set
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(level).map_err(|e| anyhow!("Invalid log level {level:?}: {e}"))?;

    if !level.to_lowercase().contains("trace") {
        for directive in QUIET_DEPENDENCIES {
            filter = filter.add_directive(directive.parse()?);
        }
        filter = filter.add_directive(format!("catalog_crawler={level}").parse()?);
    }

    Ok(filter)
}

pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_env_filter(&config.level)?,
    };

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(UtcTimeFormatter)
            .with_target(false)
    });

    let mut log_path = None;
    let file_layer = if config.file_output {
        let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {}: {e}", log_dir.display()))?;

        let (file_writer, guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(guard);
        log_path = Some(log_dir.join(&config.file_name));

        let layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(UtcTimeFormatter)
            .with_ansi(false);
        Some(if config.json_format {
            layer
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            layer.with_target(false).boxed()
        })
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    info!(level = %config.level, json = config.json_format, "Logging system initialized");
    if let Some(path) = log_path {
        info!("Log file: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_env_filter_accepts_levels() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(build_env_filter(level).is_ok(), "level {level}");
        }
    }

    #[test]
    fn test_build_env_filter_quiets_dependencies() {
        let rendered = build_env_filter("debug").unwrap().to_string();
        assert!(rendered.contains("sqlx=warn"));
        assert!(rendered.contains("catalog_crawler=debug"));

        let trace = build_env_filter("trace").unwrap().to_string();
        assert!(!trace.contains("sqlx=warn"));
    }

    #[test]
    fn test_no_output_is_rejected() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_log_directory_is_named_logs() {
        assert!(get_log_directory().ends_with("logs"));
    }
}
