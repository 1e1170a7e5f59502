//! Tracing subscriber setup for embedders that do not install their own.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {message}")]
    InvalidFilter { filter: String, message: String },
    #[error("opening log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("installing tracing subscriber: {message}")]
    Install { message: String },
}

/// Filter from `AQUADIARY_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn build_filter(config: &EnvConfig) -> Result<EnvFilter, LoggingError> {
    match &config.log_filter {
        Some(filter) => {
            EnvFilter::try_new(filter).map_err(|error| LoggingError::InvalidFilter {
                filter: filter.clone(),
                message: error.to_string(),
            })
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install a global `fmt` subscriber writing to the configured log file, or
/// to stderr when none is set.
pub fn init_logging(config: &EnvConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    let installed = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    installed.map_err(|error| LoggingError::Install {
        message: error.to_string(),
    })
}

fn open_log_file(path: &Path) -> Result<fs::File, LoggingError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}
