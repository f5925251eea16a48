//! CLI configuration
//!
//! Layered from an optional config file (TOML, JSON or YAML), the default
//! `config/default` and `config/local` files, and `CIPHERBANK__*`
//! environment variables. Command-line flags override all of them.

use cipherbank_core::deployment::DEFAULT_RECORD_PATH;
use cipherbank_core::EventBusConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherbankConfig {
    /// Key-generation service
    #[serde(default)]
    pub keygen: KeygenConfig,

    /// Deployment record output
    #[serde(default)]
    pub deployment: DeploymentSettings,

    /// Event feed sizing
    #[serde(default)]
    pub events: EventBusConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CipherbankConfig {
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("CIPHERBANK")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Key-generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygenConfig {
    #[serde(default = "default_keygen_url")]
    pub url: String,

    #[serde(default = "default_keygen_timeout")]
    pub timeout_secs: u64,
}

impl KeygenConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            url: default_keygen_url(),
            timeout_secs: default_keygen_timeout(),
        }
    }
}

/// Where the deployment record is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSettings {
    #[serde(default = "default_record_path")]
    pub path: PathBuf,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            path: default_record_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_keygen_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_keygen_timeout() -> u64 {
    30
}

fn default_record_path() -> PathBuf {
    PathBuf::from(DEFAULT_RECORD_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CipherbankConfig::default();
        assert_eq!(config.keygen.url, "http://localhost:3000");
        assert_eq!(config.deployment.path, PathBuf::from("deployments.json"));
        assert_eq!(config.events.capacity, 1000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cipherbank.toml");
        std::fs::write(
            &path,
            "[keygen]\nurl = \"http://keys.internal:9000\"\n\n[events]\nhistory_limit = 50\n",
        )
        .unwrap();

        let config = CipherbankConfig::load(path.to_str()).unwrap();

        assert_eq!(config.keygen.url, "http://keys.internal:9000");
        assert_eq!(config.keygen.timeout_secs, 30);
        assert_eq!(config.events.history_limit, 50);
        assert_eq!(config.events.capacity, 1000);
    }
}
