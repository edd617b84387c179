//! # Node Configuration
//!
//! Ledger settings plus runtime parameters, overridable from `ML_*`
//! environment variables.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ML_NETWORK_ID` | `ledger.network_id` |
//! | `ML_DIFFICULTY` | `ledger.difficulty` |
//! | `ML_BATCH_SIZE` | `ledger.batch_size` |
//! | `ML_MINING_REWARD` | `ledger.mining_reward` |
//! | `ML_MINER` | `ledger.default_miner` |
//! | `ML_MAX_ATTEMPTS` | `ledger.mining.max_attempts` (`0` = unbounded) |
//! | `ML_SNAPSHOT_PATH` | `snapshot_path` |
//! | `ML_STATUS_INTERVAL_SECS` | `status_interval_secs` |
//! | `ML_LOG` | `log_filter` |

use anyhow::{Context, Result};
use ml_07_ledger::LedgerConfig;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub ledger: LedgerConfig,
    /// Snapshot restored at startup and written at shutdown.
    pub snapshot_path: Option<PathBuf>,
    /// Seconds between status log lines (`0` disables them).
    pub status_interval_secs: u64,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            snapshot_path: None,
            status_interval_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(network_id) = lookup("ML_NETWORK_ID") {
            config.ledger.network_id = network_id;
        }
        if let Some(difficulty) = parse_var(&lookup, "ML_DIFFICULTY")? {
            config.ledger.difficulty = difficulty;
        }
        if let Some(batch_size) = parse_var(&lookup, "ML_BATCH_SIZE")? {
            config.ledger.batch_size = batch_size;
        }
        if let Some(reward) = parse_var(&lookup, "ML_MINING_REWARD")? {
            config.ledger.mining_reward = reward;
        }
        if let Some(miner) = lookup("ML_MINER").filter(|m| !m.is_empty()) {
            config.ledger.default_miner = Some(miner);
        }
        if let Some(max_attempts) = parse_var::<u64>(&lookup, "ML_MAX_ATTEMPTS")? {
            config.ledger.mining.max_attempts = (max_attempts > 0).then_some(max_attempts);
        }
        if let Some(path) = lookup("ML_SNAPSHOT_PATH").filter(|p| !p.is_empty()) {
            config.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(interval) = parse_var(&lookup, "ML_STATUS_INTERVAL_SECS")? {
            config.status_interval_secs = interval;
        }
        if let Some(filter) = lookup("ML_LOG") {
            config.log_filter = filter;
        }

        config
            .ledger
            .validate()
            .context("invalid ledger configuration")?;
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key}={raw:?} is not valid"))
        })
        .transpose()
}
