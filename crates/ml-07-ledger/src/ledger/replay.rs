//! Snapshot export and atomic import.

use super::Ledger;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
use ml_04_state_management::StateManager;
use ml_05_block_production::{Block, GENESIS_PARENT_HASH};
use std::collections::HashSet;
use tracing::{info, warn};

impl Ledger {
    /// Capture config, chain, committed state and metrics.
    pub fn export(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            chain: self.chain.clone(),
            state_entries: self.state.entries().clone(),
            metrics: self.metrics.clone(),
            exported_at: self.now(),
        }
    }

    /// Replace chain and state with a snapshot's.
    ///
    /// Every block is validated against its predecessor and replayed into a
    /// scratch state. The chain must start at index 0 and no block may carry
    /// less proof-of-work than the configured difficulty. Each block's state
    /// root and the final state must match. Nothing is committed unless every
    /// check passes. The current config is kept, pooled transactions already
    /// in the imported chain are dropped and the snapshot's metrics are
    /// adopted.
    pub fn import(&mut self, snapshot: LedgerSnapshot) -> Result<()> {
        let replayed = match self.replay(&snapshot) {
            Ok(state) => state,
            Err(e) => {
                warn!("[ml-07] Snapshot import rejected: {}", e);
                return Err(e);
            }
        };

        let LedgerSnapshot { chain, metrics, .. } = snapshot;

        let included: HashSet<_> = chain
            .iter()
            .flat_map(|b| b.transactions.iter().map(|tx| tx.id))
            .collect();
        let before = self.pool.len();
        self.pool.retain(|tx| !included.contains(&tx.id));

        self.chain = chain;
        self.state = replayed;
        self.metrics = metrics;
        self.metrics.state_size = self.state.len();

        let head = self.head()?.hash;
        info!(
            "[ml-07] Imported snapshot: {} blocks, {} state entries, {} pooled transactions dropped",
            self.chain.len(),
            self.state.len(),
            before - self.pool.len()
        );
        self.emit(LedgerEvent::SnapshotImported {
            length: self.chain.len(),
            head,
        });
        Ok(())
    }

    fn replay(&self, snapshot: &LedgerSnapshot) -> Result<StateManager> {
        if snapshot.chain.is_empty() {
            return Err(integrity("Snapshot contains no blocks".into()));
        }

        let mut state = StateManager::new(self.config.state.clone());
        let mut previous: Option<&Block> = None;

        for (i, block) in snapshot.chain.iter().enumerate() {
            if previous.is_none() {
                if block.index != 0 {
                    return Err(integrity(format!(
                        "Block {i}: Invalid genesis index {}, expected 0",
                        block.index
                    )));
                }
                if block.previous_hash != GENESIS_PARENT_HASH {
                    return Err(integrity(format!("Block {i}: Invalid genesis parent hash")));
                }
            }
            if block.difficulty < self.config.difficulty {
                return Err(integrity(format!(
                    "Block {i}: difficulty {} below required {}",
                    block.difficulty, self.config.difficulty
                )));
            }
            if let Err(errors) = block.validate(previous) {
                return Err(LedgerError::ChainIntegrity(
                    errors.iter().map(|e| format!("Block {i}: {e}")).collect(),
                ));
            }

            for (j, tx) in block.transactions.iter().enumerate() {
                state.apply(tx).map_err(|e| {
                    integrity(format!("Block {i}: transaction {j} failed to apply: {e}"))
                })?;
            }

            if block.state_root != Some(state.state_root()) {
                return Err(integrity(format!(
                    "Block {i}: state root does not match replayed state"
                )));
            }

            previous = Some(block);
        }

        if state.entries() != &snapshot.state_entries {
            return Err(integrity(
                "Snapshot state entries do not match replayed chain".into(),
            ));
        }

        Ok(state)
    }
}

fn integrity(message: String) -> LedgerError {
    LedgerError::ChainIntegrity(vec![message])
}
