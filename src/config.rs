use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::offline::{default_manifest, WorkerConfig, DEFAULT_CACHE_NAME};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Public origin of the server, used by the offline worker.
    pub origin: String,
    pub cache_name: String,
    pub sync_interval: Duration,
}

impl Config {
    /// Reads configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "PORT",
                value: raw,
            })?,
            None => 3000,
        };
        let sync_secs: u64 = match lookup("CATALOG_SYNC_INTERVAL_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "CATALOG_SYNC_INTERVAL_SECS",
                value: raw,
            })?,
            None => 3600,
        };

        Ok(Self {
            data_dir: lookup("CATALOG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            origin: lookup("CATALOG_ORIGIN")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            cache_name: lookup("CATALOG_CACHE_NAME")
                .unwrap_or_else(|| DEFAULT_CACHE_NAME.to_string()),
            sync_interval: Duration::from_secs(sync_secs.max(1)),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            cache_name: self.cache_name.clone(),
            origin: self.origin.clone(),
            manifest: default_manifest(),
        }
    }
}
