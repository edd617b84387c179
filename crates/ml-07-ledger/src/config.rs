//! Configuration types for the ledger

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

pub use ml_03_fraud_detection::FraudConfig;
pub use ml_04_state_management::StateConfig;

/// Default proof-of-work difficulty (leading zero hex characters).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Default number of pooled transactions that triggers a block.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default block reward credited to a named miner.
pub const DEFAULT_MINING_REWARD: u64 = 50;

/// Highest meaningful difficulty for a 32-byte hash.
pub const MAX_DIFFICULTY: u32 = 64;

/// Runtime configuration for the ledger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Network identifier, stamped into genesis and anchor records
    pub network_id: String,

    /// Leading zero hex characters required of every block hash
    pub difficulty: u32,

    /// Pool size that triggers automatic block production
    pub batch_size: usize,

    /// Reward credited when a block is produced for a named miner
    pub mining_reward: u64,

    /// Miner credited by automatic production (`None` = no reward)
    pub default_miner: Option<String>,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,

    /// Proof-of-work bounds
    pub mining: MiningConfig,

    /// Fraud thresholds
    pub fraud: FraudConfig,

    /// State manager settings
    pub state: StateConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network_id: "ml-devnet".to_string(),
            difficulty: DEFAULT_DIFFICULTY,
            batch_size: DEFAULT_BATCH_SIZE,
            mining_reward: DEFAULT_MINING_REWARD,
            default_miner: None,
            event_capacity: 256,
            mining: MiningConfig::default(),
            fraud: FraudConfig::default(),
            state: StateConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LedgerError::Config("batch_size must be > 0".into()));
        }
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "difficulty {} exceeds maximum {}",
                self.difficulty, MAX_DIFFICULTY
            )));
        }
        if self.event_capacity == 0 {
            return Err(LedgerError::Config("event_capacity must be > 0".into()));
        }
        if self.mining.max_attempts == Some(0) {
            return Err(LedgerError::Config("mining.max_attempts must be > 0".into()));
        }
        self.fraud.validate().map_err(LedgerError::Config)?;
        Ok(())
    }
}

/// PoW configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Hashes tried before a search is abandoned (`None` = until cancelled)
    pub max_attempts: Option<u64>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_attempts: Some(50_000_000),
        }
    }
}
