//! Structured logging setup using tracing.
//!
//! JSON lines go to a daily-rotated file under the configured log directory.
//! The interactive front end owns the terminal, so only the headless command
//! adds a console layer (on stderr).
//!
//! # Example
//!
//! ```no_run
//! use regintel::config::AppConfig;
//! use regintel::logging::init_logging;
//!
//! let config = AppConfig::default();
//! let _guard = init_logging(&config.log_level, &config, false).expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```

use anyhow::{anyhow, Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::AppConfig;

pub const LOG_FILE_PREFIX: &str = "regintel.log";

/// Keeps the non-blocking file writer alive; logs are flushed when dropped.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. With `console` set, events
/// are also written to stderr.
pub fn init_logging(log_level: &str, config: &AppConfig, console: bool) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("regintel={level}")));

    let mut layers = Vec::new();

    if console {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter.clone());
        layers.push(console_layer.boxed());
    }

    let file_guard = if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;

    tracing::info!(
        file_logging = config.file_logging,
        log_dir = %config.log_dir.display(),
        console,
        "Logging initialized"
    );

    Ok(LoggingGuard { _file_guard: file_guard })
}

pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow!(
            "Invalid log level: {level}. Must be one of: trace, debug, info, warn, error"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("Warn").unwrap(), Level::WARN);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(err.to_string().starts_with("Invalid log level: verbose"));
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_invalid_level_fails_before_touching_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            log_dir: dir.path().join("logs"),
            ..AppConfig::default()
        };
        assert!(init_logging("loud", &config, false).is_err());
        assert!(!config.log_dir.exists());
    }
}
