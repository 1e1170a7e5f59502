//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aqua_api::ApiConfig;

pub const API_URL_VAR: &str = "AQUADIARY_API_URL";
pub const TIMEOUT_MS_VAR: &str = "AQUADIARY_TIMEOUT_MS";
pub const DATA_DIR_VAR: &str = "AQUADIARY_DATA_DIR";
pub const LOG_VAR: &str = "AQUADIARY_LOG";
pub const LOG_FILE_VAR: &str = "AQUADIARY_LOG_FILE";

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_url: Option<String>,
    pub timeout: Option<Duration>,
    pub data_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env_string_opt(API_URL_VAR),
            timeout: env_string_opt(TIMEOUT_MS_VAR)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis),
            data_dir: env_string_opt(DATA_DIR_VAR).map(PathBuf::from),
            log_filter: env_string_opt(LOG_VAR),
            log_file: env_string_opt(LOG_FILE_VAR).map(PathBuf::from),
        }
    }

    /// HTTP settings with every unset value left at its default.
    pub fn api_config(&self) -> ApiConfig {
        let mut config = ApiConfig::default();
        if let Some(api_url) = &self.api_url {
            config = config.with_base_url(api_url.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }

    /// Directory holding the durable store, under the data dir or the
    /// working directory.
    pub fn store_root(&self) -> PathBuf {
        let base = self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        aqua_store::store_root(&base)
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
