//! # Fraud Detection System
//!
//! Runs the blacklist, velocity, pattern and amount checks and folds them
//! into a [`FraudVerdict`].

use super::config::FraudConfig;
use super::verdict::{CheckFinding, FraudCheck, FraudVerdict};
use ml_02_transactions::Transaction;
use shared_types::{Address, SystemTimeSource, TimeSource, Timestamp};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stateful risk scorer.
#[derive(Debug)]
pub struct FraudDetectionSystem {
    config: FraudConfig,
    blacklist: HashSet<Address>,
    /// Per-sender timestamps, oldest first, bounded by `history_capacity`.
    history: HashMap<Address, VecDeque<Timestamp>>,
    time_source: Arc<dyn TimeSource>,
}

impl Default for FraudDetectionSystem {
    fn default() -> Self {
        Self::new(FraudConfig::default())
    }
}

impl FraudDetectionSystem {
    /// Create a detector on the system clock.
    pub fn new(config: FraudConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Create a detector on an injected clock.
    pub fn with_time_source(config: FraudConfig, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            blacklist: HashSet::new(),
            history: HashMap::new(),
            time_source,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    /// Score a transaction.
    ///
    /// Mutates the sender's velocity history as a side effect, regardless of
    /// the verdict.
    pub fn check(&mut self, tx: &Transaction) -> FraudVerdict {
        let findings = vec![
            self.check_blacklist(tx),
            self.check_velocity(tx),
            self.check_pattern(tx),
            self.check_amount(tx),
        ];

        let verdict = FraudVerdict::from_findings(findings);

        if verdict.fraudulent {
            warn!(
                "[ml-03] Transaction {} flagged as fraudulent: {}",
                tx,
                verdict.reasons.join(", ")
            );
        } else if verdict.risk_score > 0.0 {
            debug!(
                "[ml-03] Transaction {} risk {:.3} ({})",
                tx,
                verdict.risk_score,
                verdict.flags().collect::<Vec<_>>().join(", ")
            );
        }

        verdict
    }

    fn check_blacklist(&self, tx: &Transaction) -> CheckFinding {
        let hit = [&tx.sender, &tx.recipient]
            .into_iter()
            .flatten()
            .any(|addr| self.blacklist.contains(addr));

        if hit {
            CheckFinding {
                check: FraudCheck::Blacklist,
                fraudulent: true,
                reason: Some("Blacklisted address".into()),
                risk_score: 1.0,
            }
        } else {
            CheckFinding::clean(FraudCheck::Blacklist)
        }
    }

    fn check_velocity(&mut self, tx: &Transaction) -> CheckFinding {
        let Some(sender) = &tx.sender else {
            return CheckFinding::clean(FraudCheck::Velocity);
        };

        let now = self.time_source.now_millis();
        let window = self.config.velocity_window_ms;
        let capacity = self.config.history_capacity.max(1);

        let history = self.history.entry(sender.clone()).or_default();
        while history
            .front()
            .is_some_and(|&ts| now.saturating_sub(ts) >= window)
        {
            history.pop_front();
        }
        history.push_back(now);
        while history.len() > capacity {
            history.pop_front();
        }

        let count = history.len();
        let max = self.config.max_velocity;
        let fraudulent = count > max;
        let risk_score = if max == 0 {
            1.0
        } else {
            (count as f64 / max as f64).min(1.0)
        };

        CheckFinding {
            check: FraudCheck::Velocity,
            fraudulent,
            reason: fraudulent.then(|| "High transaction velocity".to_string()),
            risk_score,
        }
    }

    fn check_pattern(&self, tx: &Transaction) -> CheckFinding {
        match tx.amount() {
            Some(amount) if amount != 0.0 && amount % self.config.round_amount_modulus == 0.0 => {
                CheckFinding {
                    check: FraudCheck::Pattern,
                    fraudulent: false,
                    reason: Some("Round number amount".into()),
                    risk_score: 0.3,
                }
            }
            _ => CheckFinding::clean(FraudCheck::Pattern),
        }
    }

    fn check_amount(&self, tx: &Transaction) -> CheckFinding {
        match tx.amount() {
            Some(amount) if amount > self.config.large_amount_threshold => CheckFinding {
                check: FraudCheck::Amount,
                fraudulent: false,
                reason: Some("Large amount transaction".into()),
                risk_score: 0.5,
            },
            _ => CheckFinding::clean(FraudCheck::Amount),
        }
    }

    /// Add an address to the blacklist.
    pub fn blacklist(&mut self, address: impl Into<Address>, reason: &str) {
        let address = address.into();
        info!("[ml-03] Address {} blacklisted: {}", address, reason);
        self.blacklist.insert(address);
    }

    /// Remove an address from the blacklist. Returns whether it was present.
    pub fn unblacklist(&mut self, address: &str) -> bool {
        let removed = self.blacklist.remove(address);
        if removed {
            info!("[ml-03] Address {} removed from blacklist", address);
        }
        removed
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.blacklist.contains(address)
    }

    /// Number of senders with a live velocity history.
    pub fn tracked_senders(&self) -> usize {
        self.history.len()
    }
}
