//! Validator records.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Reputation gained for a valid proposal.
pub const REPUTATION_REWARD: f64 = 0.01;

/// Reputation lost for an invalid proposal.
pub const REPUTATION_PENALTY: f64 = 0.1;

/// Registered validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub stake: u64,
    /// In `[0, 1]`. Tracked but not used for selection.
    pub reputation: f64,
    pub last_validation: Option<Timestamp>,
    pub accepted_proposals: u64,
    pub rejected_proposals: u64,
}

impl ValidatorRecord {
    pub fn new(stake: u64) -> Self {
        Self {
            stake,
            reputation: 1.0,
            last_validation: None,
            accepted_proposals: 0,
            rejected_proposals: 0,
        }
    }

    pub(crate) fn record_outcome(&mut self, valid: bool, now: Timestamp) {
        if valid {
            self.reputation = (self.reputation + REPUTATION_REWARD).min(1.0);
            self.accepted_proposals += 1;
        } else {
            self.reputation = (self.reputation - REPUTATION_PENALTY).max(0.0);
            self.rejected_proposals += 1;
        }
        self.last_validation = Some(now);
    }
}
