//! Configuration management for `chainmirror`
//!
//! Handles loading and validation of application configuration from TOML files.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::models::Partition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            backtrace: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// GraphQL endpoint of the headless node serving account diffs.
    pub headless_endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

const fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Identity under which all partition checkpoints are recorded.
    #[serde(default = "default_poller_id")]
    pub poller_id: String,
    /// Sleep between iterations when a partition is caught up with the tip.
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,
    /// Staleness (in blocks) beyond which startup reseeds from a snapshot
    /// instead of replaying diffs.
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: i64,
    /// Directory holding one `<collection>.json` snapshot per collection.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    pub partitions: Vec<PartitionConfig>,
}

fn default_poller_id() -> String {
    "diff-poller".to_string()
}

const fn default_idle_interval() -> u64 {
    100
}

const fn default_gap_threshold() -> i64 {
    10_000
}

fn default_snapshot_path() -> String {
    "snapshots".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub collection: String,
    pub account_address: String,
    #[serde(default = "default_max_window")]
    pub max_window: i64,
}

const fn default_max_window() -> i64 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub chain: ChainConfig,
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - File I/O errors (file not found, permission denied, invalid path)
    /// - TOML parsing errors (invalid syntax, type mismatches, missing required fields)
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::MirrorError::Io)?;
        let config: Self = toml::from_str(&content).map_err(crate::MirrorError::TomlParsing)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    ///
    /// Tries `config.toml` first, then falls back to `config.example.toml`.
    ///
    /// # Errors
    /// - No config file found
    /// - File I/O or TOML parsing errors
    pub fn load() -> crate::Result<Self> {
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::MirrorError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Reject configurations the sync engine cannot run safely.
    ///
    /// # Errors
    /// Returns a configuration error when no partitions are defined, when a
    /// collection appears twice (two pollers would fight over one checkpoint),
    /// or when a window size is not positive.
    pub fn validate(&self) -> crate::Result<()> {
        if self.sync.partitions.is_empty() {
            return Err(crate::MirrorError::Config(
                "at least one [[sync.partitions]] entry is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for partition in &self.sync.partitions {
            if !seen.insert(partition.collection.as_str()) {
                return Err(crate::MirrorError::Config(format!(
                    "duplicate partition for collection '{}'",
                    partition.collection
                )));
            }
            if partition.max_window < 1 {
                return Err(crate::MirrorError::Config(format!(
                    "max_window for collection '{}' must be >= 1, got {}",
                    partition.collection, partition.max_window
                )));
            }
        }
        Ok(())
    }

    /// Database connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Headless node GraphQL endpoint.
    #[must_use]
    pub fn headless_endpoint(&self) -> &str {
        &self.chain.headless_endpoint
    }

    /// Materialize the configured partitions with the shared poller identity.
    #[must_use]
    pub fn partitions(&self) -> Vec<Partition> {
        self.sync
            .partitions
            .iter()
            .map(|p| {
                Partition::new(
                    self.sync.poller_id.clone(),
                    p.collection.clone(),
                    p.account_address.clone(),
                    p.max_window,
                )
            })
            .collect()
    }
}
