//! # Ledger Snapshots
//!
//! Export/import format for the in-memory ledger. A snapshot is
//! self-verifying: importing it replays every block, so a corrupted snapshot
//! is rejected rather than trusted.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::metrics::LedgerMetrics;
use ml_04_state_management::StateValue;
use ml_05_block_production::Block;
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use std::collections::BTreeMap;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub config: LedgerConfig,
    pub chain: Vec<Block>,
    /// Committed state at export time. Must match the replayed chain.
    pub state_entries: BTreeMap<String, StateValue>,
    pub metrics: LedgerMetrics,
    pub exported_at: Timestamp,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(input).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        Ok(snapshot)
    }

    /// Last block, if any.
    pub fn head(&self) -> Option<&Block> {
        self.chain.last()
    }
}
