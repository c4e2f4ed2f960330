use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize logging system based on configuration
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // RUST_LOG overrides the configured level
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());

    // EnvFilter is not shareable across layers, so each layer parses
    // its own copy
    let make_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::from_str(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
        })
    };

    let Some(log_file) = &config.file else {
        // Console logging only
        if config.json {
            tracing_subscriber::fmt()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .json()
                .with_env_filter(make_filter())
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_env_filter(make_filter())
                .init();
        }
        return Ok(None);
    };

    let (non_blocking, guard) = if config.rotation {
        let path = std::path::Path::new(log_file);
        let file_appender = tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("ech-connect.log"),
        );
        tracing_appender::non_blocking(file_appender)
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file: {}", log_file))?;
        tracing_appender::non_blocking(file)
    };

    if config.json {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_filter(make_filter());
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .json()
            .with_filter(make_filter());
        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_filter(make_filter());
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_filter(make_filter());
        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    Ok(Some(guard))
}
