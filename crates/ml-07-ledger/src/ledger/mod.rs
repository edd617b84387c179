//! # Ledger Orchestrator
//!
//! Owns the chain, the pending pool and the committed state, and wires the
//! other subsystems together:
//!
//! ```text
//! submit ──→ validate ──→ payload check ──→ fraud check ──→ pool
//!                                                            │ batch full / explicit
//!                                                            ↓
//! append ←── validate(head) ←── mine ←── state_root ←── apply (staged copy)
//! ```
//!
//! ## Single Writer
//!
//! Every mutation takes `&mut self`. Concurrent access goes through
//! [`crate::LedgerService`], which serializes writers and keeps the nonce
//! search outside the lock.

mod production;
mod queries;
mod replay;


pub use production::PendingBlock;
pub use queries::{
    AnchorRecord, ChainStats, LedgerStats, TransactionLookup, TransactionProof,
    TransactionStatus,
};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::metrics::LedgerMetrics;
use ml_02_transactions::{Transaction, TxId};
use ml_03_fraud_detection::FraudDetectionSystem;
use ml_04_state_management::StateManager;
use ml_05_block_production::{Block, MiningCancel, MiningControl};
use ml_06_consensus::ConsensusEngine;
use shared_types::{short_hex, Address, SystemTimeSource, TimeSource};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// The Merkle-anchored ledger.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    chain: Vec<Block>,
    pool: VecDeque<Transaction>,
    state: StateManager,
    fraud: FraudDetectionSystem,
    consensus: ConsensusEngine,
    metrics: LedgerMetrics,
    events: broadcast::Sender<LedgerEvent>,
    cancel: MiningCancel,
    time_source: Arc<dyn TimeSource>,
}

impl Ledger {
    /// Create a ledger on the system clock and mine its genesis block.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Create a ledger on an injected clock and mine its genesis block.
    pub fn with_time_source(config: LedgerConfig, time_source: Arc<dyn TimeSource>) -> Result<Self> {
        config.validate()?;

        let (events, _) = broadcast::channel(config.event_capacity);
        let mut ledger = Self {
            state: StateManager::new(config.state.clone()),
            fraud: FraudDetectionSystem::with_time_source(
                config.fraud.clone(),
                Arc::clone(&time_source),
            ),
            consensus: ConsensusEngine::new(Arc::clone(&time_source)),
            chain: Vec::new(),
            pool: VecDeque::new(),
            metrics: LedgerMetrics::new(),
            events,
            cancel: MiningCancel::new(),
            time_source,
            config,
        };
        ledger.init()?;
        Ok(ledger)
    }

    /// Mine and append the genesis block if the chain is empty.
    pub fn init(&mut self) -> Result<()> {
        if !self.chain.is_empty() {
            return Ok(());
        }
        let genesis = self.create_genesis()?;
        info!(
            "[ml-07] Genesis block {} created for network {}",
            short_hex(&genesis.hash),
            self.config.network_id
        );
        Ok(())
    }

    /// Admit a transaction to the pool, producing a block once the pool
    /// reaches `batch_size`.
    ///
    /// A failed automatic production is logged and published as
    /// [`LedgerEvent::AutoProductionFailed`]; the submission itself has
    /// already succeeded.
    pub fn submit(&mut self, tx: Transaction) -> Result<TxId> {
        let tx_id = self.admit(tx)?;

        if self.batch_ready() {
            let miner = self.config.default_miner.clone();
            if let Err(e) = self.produce_block(miner.as_deref()) {
                self.report_auto_production_failure(&e);
            }
        }

        Ok(tx_id)
    }

    /// Validate, screen and enqueue a transaction without producing.
    pub fn admit(&mut self, tx: Transaction) -> Result<TxId> {
        if let Err(errors) = tx.validate() {
            return Err(self.reject(&tx, LedgerError::Validation(errors)));
        }

        if let Err(e) = StateManager::check_transition(&tx) {
            return Err(self.reject(&tx, LedgerError::InvalidPayload(e)));
        }

        let verdict = self.fraud.check(&tx);
        if verdict.fraudulent {
            let err = LedgerError::FraudRejected {
                reasons: verdict.reasons,
                risk_score: verdict.risk_score,
            };
            return Err(self.reject(&tx, err));
        }

        let tx_id = tx.id;
        debug!(
            "[ml-07] Transaction {} admitted (risk {:.2}, pool {})",
            tx,
            verdict.risk_score,
            self.pool.len() + 1
        );
        self.emit(LedgerEvent::TransactionAccepted {
            tx_id,
            kind: tx.kind,
            risk_score: verdict.risk_score,
        });
        self.pool.push_back(tx);

        Ok(tx_id)
    }

    fn reject(&mut self, tx: &Transaction, err: LedgerError) -> LedgerError {
        warn!("[ml-07] Transaction {} rejected: {}", tx, err);
        self.metrics.record_rejected_transaction();
        self.emit(LedgerEvent::TransactionRejected {
            tx_id: tx.id,
            reason: err.to_string(),
        });
        err
    }

    /// Whether the pool has reached `batch_size`.
    pub fn batch_ready(&self) -> bool {
        self.pool.len() >= self.config.batch_size
    }

    /// Log and publish a failed automatic production.
    pub fn report_auto_production_failure(&self, err: &LedgerError) {
        warn!("[ml-07] Automatic block production failed: {}", err);
        self.emit(LedgerEvent::AutoProductionFailed {
            error: err.to_string(),
        });
    }

    pub(crate) fn emit(&self, event: LedgerEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Subscribe to ledger events.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Limits for the next nonce search.
    pub fn mining_control(&self) -> MiningControl {
        MiningControl::new(self.config.mining.max_attempts, self.cancel.clone())
    }

    /// Token that aborts every current and future search of this ledger.
    pub fn cancel_token(&self) -> MiningCancel {
        self.cancel.clone()
    }

    pub fn blacklist(&mut self, address: impl Into<Address>, reason: &str) {
        self.fraud.blacklist(address, reason);
    }

    pub fn unblacklist(&mut self, address: &str) -> bool {
        self.fraud.unblacklist(address)
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.fraud.is_blacklisted(address)
    }

    pub fn register_validator(&mut self, address: impl Into<Address>, stake: u64) {
        self.consensus.register(address, stake);
    }

    pub fn consensus(&self) -> &ConsensusEngine {
        &self.consensus
    }

    pub fn consensus_mut(&mut self) -> &mut ConsensusEngine {
        &mut self.consensus
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Pending transactions in FIFO order.
    pub fn pending_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.pool.iter()
    }

    pub(crate) fn head(&self) -> Result<&Block> {
        self.chain
            .last()
            .ok_or_else(|| LedgerError::ChainIntegrity(vec!["chain is empty".into()]))
    }

    /// Clock used for transactions, blocks and fraud windows.
    pub fn time_source(&self) -> Arc<dyn TimeSource> {
        Arc::clone(&self.time_source)
    }

    pub(crate) fn now(&self) -> u64 {
        self.time_source.now_millis()
    }
}
