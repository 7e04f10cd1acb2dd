//! Tracing setup for the confradar binaries.
//!
//! With `logging.to_file` set, events go to a fresh
//! `<paths.state>/logs/confradar-<UTC timestamp>.log`; otherwise to stderr.
//! `RUST_LOG` takes precedence over both `--debug` and `logging.level`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub struct LoggingHandle {
    /// Flushes the file writer on drop; hold it until `main` returns
    pub _guard: Option<WorkerGuard>,

    /// Set when logging to a file
    pub log_file_path: Option<PathBuf>,
}

/// `--debug` wins over the configured level
fn level_directive(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

fn env_filter(config: &Config, debug_override: bool) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
        _ => EnvFilter::new(level_directive(config, debug_override)),
    }
}

fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("confradar-{timestamp}.log")
}

/// Install the global subscriber. Call once, before any wizard work.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let registry = tracing_subscriber::registry().with(env_filter(config, debug_override));

    if !config.logging.to_file {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
        return Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        });
    }

    let logs_dir = config.logs_path();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let file_name = log_file_name();
    let appender = tracing_appender::rolling::never(&logs_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    registry
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    let log_file_path = logs_dir.join(file_name);
    tracing::debug!(path = %log_file_path.display(), "file logging enabled");

    Ok(LoggingHandle {
        _guard: Some(guard),
        log_file_path: Some(log_file_path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_logs_path_under_state_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_log_file_name_format() {
        let name = log_file_name();
        assert!(name.starts_with("confradar-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_debug_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.logging.level = "warn".to_string();

        assert_eq!(level_directive(&config, true), "debug");
        assert_eq!(level_directive(&config, false), "warn");
    }
}
