//! Layered configuration for indexing consumers: a TOML file with
//! environment-variable overrides, following the `TomlConfigProvider`
//! pattern used elsewhere in this workspace.

use indexer_types::{IndexerError, NetworkId};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

fn default_batch_size() -> u32 {
    100
}

fn default_period_hours() -> u32 {
    4
}

fn default_partition_size() -> u32 {
    4_000
}

/// Per-consumer milestone cadence defaults, per the observability contract.
#[derive(Debug, Clone, Copy)]
pub struct MilestoneDefaults;

impl MilestoneDefaults {
    pub const TRANSFERS: u32 = 10_000;
    pub const BLOCK_STREAM: u32 = 5_000;
    pub const MONEY_FLOW: u32 = 1_000;
    pub const BALANCE_SERIES: u32 = 5_000;
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub network: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_period_hours")]
    pub period_hours: u32,

    #[serde(default = "default_partition_size")]
    pub partition_size: u32,

    pub chain_node_url: String,
    pub block_stream_dsn: String,
    pub columnar_store_dsn: String,
    pub graph_store_dsn: String,

    #[serde(default)]
    pub milestone_interval: Option<u32>,

    /// Block-count threshold for the Money Flow periodic analytics cadence.
    #[serde(default = "default_analytics_cadence")]
    pub analytics_cadence_blocks: u32,
}

fn default_analytics_cadence() -> u32 {
    1_000
}

impl AppConfig {
    /// Loads from a TOML file at `path`, then applies `INDEXER_*`
    /// environment variable overrides, then validates required fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            IndexerError::ConfigError(format!(
                "could not read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, IndexerError> {
        let mut config: AppConfig = toml::from_str(text)
            .map_err(|e| IndexerError::ConfigError(format!("invalid config: {e}")))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("INDEXER_NETWORK") {
            self.network = v;
        }
        if let Ok(v) = std::env::var("INDEXER_BATCH_SIZE") {
            if let Ok(n) = v.parse() {
                self.batch_size = n;
            }
        }
        if let Ok(v) = std::env::var("INDEXER_CHAIN_NODE_URL") {
            self.chain_node_url = v;
        }
    }

    fn validate(&self) -> Result<(), IndexerError> {
        NetworkId::from_str(&self.network)
            .map_err(|e| IndexerError::ConfigError(format!("network: {e}")))?;

        if self.batch_size == 0 {
            return Err(IndexerError::ConfigError(
                "batch_size must be positive".into(),
            ));
        }
        if self.period_hours == 0 {
            return Err(IndexerError::ConfigError(
                "period_hours must be positive".into(),
            ));
        }
        for (field, value) in [
            ("chain_node_url", &self.chain_node_url),
            ("block_stream_dsn", &self.block_stream_dsn),
            ("columnar_store_dsn", &self.columnar_store_dsn),
            ("graph_store_dsn", &self.graph_store_dsn),
        ] {
            if value.trim().is_empty() {
                return Err(IndexerError::ConfigError(format!(
                    "{field} is required and must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn network_id(&self) -> NetworkId {
        NetworkId::from_str(&self.network).expect("validated at load time")
    }

    /// Resolves the milestone interval for a named consumer, falling back to
    /// that consumer's documented default when unset in config.
    pub fn milestone_interval_for(&self, consumer_default: u32) -> u32 {
        self.milestone_interval.unwrap_or(consumer_default)
    }

    /// A short human-readable summary for the startup lifecycle log line.
    pub fn summary(&self) -> String {
        format!(
            "network={} batch_size={} period_hours={} partition_size={}",
            self.network, self.batch_size, self.period_hours, self.partition_size
        )
    }
}
