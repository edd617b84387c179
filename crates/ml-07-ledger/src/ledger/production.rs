//! Block production: prepare → mine → commit.
//!
//! `prepare_block` and `commit_block` are short `&mut self` sections.
//! Mining happens on a [`PendingBlock`] that borrows nothing from the ledger,
//! so a caller holding the ledger behind a lock can release it while the
//! nonce search runs.

use super::Ledger;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use ml_02_transactions::Transaction;
use ml_04_state_management::StateManager;
use ml_05_block_production::{
    genesis_transaction, reward_transaction, Block, MiningControl, MiningError, MiningOutcome,
    GENESIS_PARENT_HASH,
};
use shared_types::{short_hex, Hash};
use tracing::{error, info, warn};

/// A block assembled against a staged copy of state, awaiting its seal.
#[derive(Debug)]
pub struct PendingBlock {
    block: Block,
    staged_state: StateManager,
    /// Pool transactions in the block, in FIFO order (reward excluded).
    drained: Vec<Transaction>,
    parent_hash: Hash,
}

impl PendingBlock {
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn index(&self) -> u64 {
        self.block.index
    }

    /// Run the nonce search. Borrows nothing from the ledger.
    pub fn mine(&mut self, control: &MiningControl) -> std::result::Result<MiningOutcome, MiningError> {
        self.block.mine(control)
    }

    #[cfg(test)]
    pub(super) fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }
}

impl Ledger {
    pub(super) fn create_genesis(&mut self) -> Result<Block> {
        let clock = self.time_source.as_ref();
        let tx = genesis_transaction(clock, &self.config.network_id);

        let mut staged = self.state.clone();
        staged.apply(&tx)?;

        let mut block = Block::new_at(
            clock,
            0,
            vec![tx],
            GENESIS_PARENT_HASH,
            self.config.difficulty,
        );
        block.set_state_root(staged.state_root());
        let outcome = block.mine(&self.mining_control())?;

        block
            .validate(None)
            .map_err(|errors| {
                LedgerError::ChainIntegrity(
                    errors.iter().map(|e| format!("Block 0: {e}")).collect(),
                )
            })?;

        self.state = staged;
        self.metrics
            .record_block(block.transactions.len(), None, outcome.hash_rate(), self.state.len());
        self.chain.push(block.clone());
        self.emit(LedgerEvent::BlockAppended {
            index: 0,
            hash: block.hash,
            transaction_count: block.transactions.len(),
            state_root: self.state.state_root(),
        });
        Ok(block)
    }

    /// Drain, apply, assemble, mine, validate and append one block.
    ///
    /// With `miner`, a reward transaction crediting it is appended to the
    /// block.
    pub fn produce_block(&mut self, miner: Option<&str>) -> Result<Block> {
        let mut pending = self.prepare_block(miner)?;
        match pending.mine(&self.mining_control()) {
            Ok(outcome) => self.commit_block(pending, outcome),
            Err(e) => Err(self.abort_block(pending, e)),
        }
    }

    /// Drain up to `batch_size` transactions and build an unsealed block.
    ///
    /// Transactions are applied to a clone of committed state; the ledger's
    /// own state is untouched until [`Ledger::commit_block`].
    pub fn prepare_block(&mut self, miner: Option<&str>) -> Result<PendingBlock> {
        if self.pool.is_empty() {
            return Err(LedgerError::NoPendingTransactions);
        }

        let head = self.head()?;
        let parent_hash = head.hash;
        let index = head.index + 1;

        let take = self.config.batch_size.min(self.pool.len());
        let batch: Vec<Transaction> = self.pool.drain(..take).collect();

        let mut staged = self.state.clone();
        let mut drained = Vec::with_capacity(batch.len());
        for tx in batch {
            match staged.apply(&tx) {
                Ok(_) => drained.push(tx),
                Err(e) => {
                    warn!("[ml-07] Dropping transaction {} from block {}: {}", tx, index, e);
                    self.emit(LedgerEvent::TransactionRejected {
                        tx_id: tx.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if drained.is_empty() {
            warn!(
                "[ml-07] Block {} discarded: all {} drained transactions failed to apply",
                index, take
            );
            return Err(LedgerError::BatchDiscarded { dropped: take });
        }

        let mut transactions = drained.clone();
        if let Some(miner) = miner {
            let reward =
                reward_transaction(self.time_source.as_ref(), miner, self.config.mining_reward);
            match staged.apply(&reward) {
                Ok(_) => transactions.push(reward),
                Err(e) => {
                    warn!("[ml-07] Block {} sealed without reward for {}: {}", index, miner, e);
                    self.emit(LedgerEvent::TransactionRejected {
                        tx_id: reward.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut block = Block::new_at(
            self.time_source.as_ref(),
            index,
            transactions,
            parent_hash,
            self.config.difficulty,
        );
        block.set_state_root(staged.state_root());

        Ok(PendingBlock {
            block,
            staged_state: staged,
            drained,
            parent_hash,
        })
    }

    /// Validate a sealed block against the head and append it.
    ///
    /// A block that fails validation is discarded together with its staged
    /// state and transactions. A block whose parent is no longer the head
    /// has its transactions re-queued.
    pub fn commit_block(&mut self, pending: PendingBlock, outcome: MiningOutcome) -> Result<Block> {
        let head = self.head()?;
        if head.hash != pending.parent_hash {
            let err = LedgerError::StaleBlock {
                expected_parent: pending.parent_hash,
                head: head.hash,
            };
            warn!("[ml-07] {}", err);
            self.requeue(pending.drained);
            return Err(err);
        }

        if let Err(errors) = pending.block.validate(Some(head)) {
            let index = pending.block.index;
            let messages: Vec<String> = errors
                .iter()
                .map(|e| format!("Block {index}: {e}"))
                .collect();
            error!(
                "[ml-07] Block {} rejected; discarding {} transactions: {}",
                index,
                pending.drained.len(),
                messages.join("; ")
            );
            self.metrics.record_rejected_block();
            self.emit(LedgerEvent::BlockRejected {
                index,
                errors: messages.clone(),
            });
            return Err(LedgerError::ChainIntegrity(messages));
        }

        let block_time = pending.block.timestamp.saturating_sub(head.timestamp);
        let PendingBlock {
            block,
            staged_state,
            ..
        } = pending;

        self.state = staged_state;
        self.metrics.record_block(
            block.transactions.len(),
            Some(block_time),
            outcome.hash_rate(),
            self.state.len(),
        );
        self.chain.push(block.clone());

        info!(
            "[ml-07] Block {} appended: hash={} txs={} state_root={}",
            block.index,
            short_hex(&block.hash),
            block.transactions.len(),
            short_hex(&self.state.state_root())
        );
        self.emit(LedgerEvent::BlockAppended {
            index: block.index,
            hash: block.hash,
            transaction_count: block.transactions.len(),
            state_root: self.state.state_root(),
        });

        Ok(block)
    }

    /// Handle an unsuccessful search: re-queue the drained transactions at
    /// the front of the pool and drop the staged state.
    pub fn abort_block(&mut self, pending: PendingBlock, err: MiningError) -> LedgerError {
        let index = pending.block.index;
        let requeued = pending.drained.len();
        warn!(
            "[ml-07] Mining block {} aborted ({}); re-queueing {} transactions",
            index, err, requeued
        );
        self.requeue(pending.drained);
        self.metrics.record_aborted_mining();
        self.emit(LedgerEvent::MiningAborted { index, requeued });
        LedgerError::MiningAborted(err)
    }

    fn requeue(&mut self, drained: Vec<Transaction>) {
        for tx in drained.into_iter().rev() {
            self.pool.push_front(tx);
        }
    }
}
