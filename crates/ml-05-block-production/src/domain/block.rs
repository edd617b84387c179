//! # Block Entity
//!
//! An ordered batch of transactions sealed by proof-of-work.
//!
//! ## Lifecycle
//!
//! ```text
//! new(txs, prev) ──→ set_state_root ──→ mine ──→ validate(prev) ──→ appended
//! ```
//!
//! The transaction Merkle root is computed in [`Block::new`]. The state root
//! must be assigned before [`Block::mine`]; mining without one fails.

use super::errors::{AbortReason, BlockValidationError, MiningError};
use super::mining::{meets_difficulty, MiningControl, MiningOutcome};
use ml_01_merkle_tree::MerkleTree;
use ml_02_transactions::{join_errors, Transaction, TxId};
use serde::{Deserialize, Serialize};
use shared_crypto::sha256;
use shared_types::{
    hex_hash, hex_hash_opt, short_hex, CanonicalEncoder, Hash, SystemTimeSource, TimeSource,
    Timestamp,
};
use std::time::Instant;
use tracing::{debug, info};

/// How often the nonce loop polls the cancellation token.
const CANCEL_POLL_INTERVAL: u64 = 1_024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Chain position. Genesis is 0.
    pub index: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<Transaction>,
    #[serde(with = "hex_hash")]
    pub previous_hash: Hash,
    /// Root over the transaction hashes, in order.
    #[serde(with = "hex_hash")]
    pub merkle_root: Hash,
    /// State root after applying this block's transactions.
    #[serde(with = "hex_hash_opt")]
    pub state_root: Option<Hash>,
    pub nonce: u64,
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    /// Required leading zero hex characters.
    pub difficulty: u32,
}

/// Block summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    pub index: u64,
    pub transaction_count: usize,
    pub difficulty: u32,
    pub nonce: u64,
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    #[serde(with = "hex_hash")]
    pub merkle_root: Hash,
}

impl Block {
    /// Assemble a block on the system clock.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: Hash,
        difficulty: u32,
    ) -> Self {
        Self::new_at(&SystemTimeSource, index, transactions, previous_hash, difficulty)
    }

    /// Assemble a block stamped by `clock`.
    pub fn new_at(
        clock: &dyn TimeSource,
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: Hash,
        difficulty: u32,
    ) -> Self {
        let merkle_root = Self::compute_merkle_root(&transactions);
        let mut block = Self {
            index,
            timestamp: clock.now_millis(),
            transactions,
            previous_hash,
            merkle_root,
            state_root: None,
            nonce: 0,
            hash: [0u8; 32],
            difficulty,
        };
        block.hash = block.calculate_hash();
        block
    }

    fn compute_merkle_root(transactions: &[Transaction]) -> Hash {
        Self::tree_over(transactions).root()
    }

    fn tree_over(transactions: &[Transaction]) -> MerkleTree {
        MerkleTree::from_leaf_hashes(transactions.iter().map(Transaction::hash).collect())
    }

    /// Assign the post-transition state root. Refreshes the block hash.
    pub fn set_state_root(&mut self, state_root: Hash) {
        self.state_root = Some(state_root);
        self.hash = self.calculate_hash();
    }

    /// `H(index, timestamp, previous_hash, merkle_root, nonce, state_root)`.
    pub fn calculate_hash(&self) -> Hash {
        self.hash_with_nonce(self.nonce)
    }

    fn hash_with_nonce(&self, nonce: u64) -> Hash {
        let bytes = CanonicalEncoder::new()
            .u64(self.index)
            .u64(self.timestamp)
            .hash(&self.previous_hash)
            .hash(&self.merkle_root)
            .u64(nonce)
            .opt_hash(self.state_root.as_ref())
            .finish();
        sha256(&bytes)
    }

    /// Search for a nonce whose hash satisfies `difficulty`.
    ///
    /// Starts from the current nonce. On success the block's `nonce` and
    /// `hash` are updated; on abort the block is left as it was.
    #[tracing::instrument(skip(self, control), fields(index = self.index, difficulty = self.difficulty))]
    pub fn mine(&mut self, control: &MiningControl) -> Result<MiningOutcome, MiningError> {
        if self.state_root.is_none() {
            return Err(MiningError::MissingStateRoot { index: self.index });
        }

        let started = Instant::now();
        let mut nonce = self.nonce;
        let mut attempts: u64 = 0;

        loop {
            if attempts % CANCEL_POLL_INTERVAL == 0 && control.cancel.is_cancelled() {
                debug!("[ml-05] Mining block {} cancelled", self.index);
                return Err(MiningError::Aborted {
                    attempts,
                    reason: AbortReason::Cancelled,
                });
            }
            if control.max_attempts.is_some_and(|max| attempts >= max) {
                debug!(
                    "[ml-05] Mining block {} gave up after {} attempts",
                    self.index, attempts
                );
                return Err(MiningError::Aborted {
                    attempts,
                    reason: AbortReason::MaxAttempts,
                });
            }

            let hash = self.hash_with_nonce(nonce);
            attempts += 1;

            if meets_difficulty(&hash, self.difficulty) {
                self.nonce = nonce;
                self.hash = hash;
                let outcome = MiningOutcome {
                    nonce,
                    hash,
                    attempts,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                info!(
                    "[ml-05] Block {} mined: hash={} nonce={} attempts={}",
                    self.index,
                    short_hex(&hash),
                    nonce,
                    attempts
                );
                return Ok(outcome);
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => {
                    return Err(MiningError::Aborted {
                        attempts,
                        reason: AbortReason::NonceSpaceExhausted,
                    })
                }
            };
        }
    }

    /// Whether the stored hash satisfies the block's difficulty.
    pub fn has_valid_work(&self) -> bool {
        meets_difficulty(&self.hash, self.difficulty)
    }

    /// Run every structural check and report all failures.
    ///
    /// With `previous`, the link (`previous_hash`, `index`) is checked too.
    pub fn validate(&self, previous: Option<&Block>) -> Result<(), Vec<BlockValidationError>> {
        let mut errors = Vec::new();

        let computed = self.calculate_hash();
        if computed != self.hash {
            errors.push(BlockValidationError::HashMismatch {
                stored: self.hash,
                computed,
            });
        }

        if let Some(prev) = previous {
            if self.previous_hash != prev.hash {
                errors.push(BlockValidationError::PreviousHashMismatch {
                    expected: prev.hash,
                    found: self.previous_hash,
                });
            }
            let expected_index = prev.index.saturating_add(1);
            if self.index != expected_index {
                errors.push(BlockValidationError::IndexMismatch {
                    expected: expected_index,
                    found: self.index,
                });
            }
        }

        let merkle = Self::compute_merkle_root(&self.transactions);
        if merkle != self.merkle_root {
            errors.push(BlockValidationError::MerkleRootMismatch {
                stored: self.merkle_root,
                computed: merkle,
            });
        }

        for (index, tx) in self.transactions.iter().enumerate() {
            if let Err(tx_errors) = tx.validate() {
                errors.push(BlockValidationError::InvalidTransaction {
                    index,
                    reason: join_errors(&tx_errors),
                });
            }
        }

        if self.state_root.is_none() {
            errors.push(BlockValidationError::MissingStateRoot);
        }

        if !self.has_valid_work() {
            errors.push(BlockValidationError::InsufficientWork {
                difficulty: self.difficulty,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Rebuild the transaction tree (it is not stored).
    pub fn transaction_tree(&self) -> MerkleTree {
        Self::tree_over(&self.transactions)
    }

    /// Position of a transaction in this block.
    pub fn transaction_index(&self, tx_id: &TxId) -> Option<usize> {
        self.transactions.iter().position(|tx| tx.id == *tx_id)
    }

    pub fn stats(&self) -> BlockStats {
        BlockStats {
            index: self.index,
            transaction_count: self.transactions.len(),
            difficulty: self.difficulty,
            nonce: self.nonce,
            hash: self.hash,
            merkle_root: self.merkle_root,
        }
    }
}
