//! # Consensus Engine
//!
//! Stake-proportional validator selection.
//!
//! ALGORITHM: draw `r` uniformly from `[0, total_stake)`, walk validators in
//! address order accumulating stake, pick the first whose running sum
//! exceeds `r`. Reputation is recorded on every proposal but does not affect
//! selection.

use super::validator::ValidatorRecord;
use ml_05_block_production::Block;
use rand::Rng;
use shared_types::{Address, SystemTimeSource, TimeSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConsensusEngine {
    validators: BTreeMap<Address, ValidatorRecord>,
    time_source: Arc<dyn TimeSource>,
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemTimeSource))
    }
}

impl ConsensusEngine {
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            validators: BTreeMap::new(),
            time_source,
        }
    }

    /// Register or re-stake a validator. Reputation resets to 1.0.
    pub fn register(&mut self, address: impl Into<Address>, stake: u64) {
        let address = address.into();
        info!("[ml-06] Validator {} registered with stake {}", address, stake);
        self.validators.insert(address, ValidatorRecord::new(stake));
    }

    /// Remove a validator, returning its record.
    pub fn unregister(&mut self, address: &str) -> Option<ValidatorRecord> {
        let removed = self.validators.remove(address);
        if removed.is_some() {
            info!("[ml-06] Validator {} unregistered", address);
        }
        removed
    }

    pub fn validator(&self, address: &str) -> Option<&ValidatorRecord> {
        self.validators.get(address)
    }

    pub fn validators(&self) -> impl Iterator<Item = (&Address, &ValidatorRecord)> {
        self.validators.iter()
    }

    pub fn total_stake(&self) -> u64 {
        self.validators
            .values()
            .fold(0u64, |acc, v| acc.saturating_add(v.stake))
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Pick a validator with the thread RNG.
    pub fn select_validator(&self) -> Option<Address> {
        self.select_validator_with(&mut rand::thread_rng())
    }

    /// Pick a validator with a caller-supplied RNG.
    ///
    /// `None` when no validator holds stake.
    pub fn select_validator_with<R: Rng>(&self, rng: &mut R) -> Option<Address> {
        let total = self.total_stake();
        if total == 0 {
            return None;
        }

        let draw = rng.gen_range(0..total);
        let mut cumulative = 0u64;
        for (address, record) in &self.validators {
            cumulative = cumulative.saturating_add(record.stake);
            if cumulative > draw {
                debug!("[ml-06] Selected validator {} (draw {}/{})", address, draw, total);
                return Some(address.clone());
            }
        }
        None
    }

    /// Validate a proposed block and update the proposer's reputation.
    ///
    /// Unregistered proposers are rejected without validating.
    pub fn validate_proposal(&mut self, block: &Block, proposer: &str) -> bool {
        let now = self.time_source.now_millis();
        let Some(record) = self.validators.get_mut(proposer) else {
            warn!("[ml-06] Proposal from unregistered validator {}", proposer);
            return false;
        };

        let result = block.validate(None);
        let valid = result.is_ok();
        record.record_outcome(valid, now);

        match result {
            Ok(()) => debug!(
                "[ml-06] Proposal {} from {} accepted (reputation {:.2})",
                block.index, proposer, record.reputation
            ),
            Err(errors) => warn!(
                "[ml-06] Proposal {} from {} rejected: {} error(s), reputation {:.2}",
                block.index,
                proposer,
                errors.len(),
                record.reputation
            ),
        }

        valid
    }
}
