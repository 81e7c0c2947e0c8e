//! Logging utilities for keepalived-notify components.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "unknown log format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing with sensible defaults.
///
/// Uses the RUST_LOG environment variable to control log levels.
/// Default level is INFO.
pub fn init() -> Result<()> {
    init_with(LogFormat::Text, None)
}

/// Initialize tracing to stderr and, optionally, appending to `log_file`.
///
/// If the log file cannot be opened the error is logged and stderr logging
/// stays active, so a broken log path never prevents the hook from running.
pub fn init_with(format: LogFormat, log_file: Option<&Path>) -> Result<()> {
    let (file, open_error) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (Some(Arc::new(file)), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    let stderr_layer = match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let file_layer = file.map(|file| match format {
        LogFormat::Text => fmt::layer().with_ansi(false).with_writer(file).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(file).boxed(),
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(default_filter())
        .try_init()
        .map_err(Error::other)?;

    if let Some(path) = log_file {
        match open_error {
            Some(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to log to file"),
            None => tracing::info!(path = %path.display(), "Logging to file"),
        }
    }

    Ok(())
}
