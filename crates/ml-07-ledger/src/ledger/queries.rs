//! Read-side operations: proofs, lookups, statistics.

use super::Ledger;
use crate::metrics::LedgerMetrics;
use ml_01_merkle_tree::{MerkleProof, MerkleTree};
use ml_02_transactions::{Transaction, TxId};
use ml_04_state_management::StateStats;
use ml_05_block_production::{Block, GENESIS_PARENT_HASH};
use serde::{Deserialize, Serialize};
use shared_types::{hex_hash, Hash, Timestamp};

/// Proof that a transaction is included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProof {
    #[serde(with = "hex_hash")]
    pub block_hash: Hash,
    pub block_index: u64,
    pub tx_index: usize,
    pub merkle_proof: MerkleProof,
    #[serde(with = "hex_hash")]
    pub merkle_root: Hash,
}

/// A confirmed transaction and where it lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLookup {
    pub transaction: Transaction,
    pub block_index: u64,
    #[serde(with = "hex_hash")]
    pub block_hash: Hash,
    pub tx_index: usize,
    /// Blocks on top of (and including) the containing block.
    pub confirmations: u64,
}

/// Lifecycle position of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Waiting in the pool at `position` (0 = next).
    Pending { position: usize },
    /// Included in block `block_index`.
    Confirmed { block_index: u64, confirmations: u64 },
}

/// Chain summary for external readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    pub length: usize,
    pub pending_count: usize,
    pub difficulty: u32,
    #[serde(with = "hex_hash")]
    pub last_block_hash: Hash,
}

/// Full ledger statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStats {
    pub chain: ChainStats,
    pub metrics: LedgerMetrics,
    pub state: StateStats,
    pub validators: usize,
    pub total_stake: u64,
}

/// Payload for anchoring the ledger's head in an external system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    #[serde(with = "hex_hash")]
    pub block_hash: Hash,
    pub block_index: u64,
    #[serde(with = "hex_hash")]
    pub state_root: Hash,
    pub timestamp: Timestamp,
    pub network_id: String,
}

impl Ledger {
    /// Walk the chain and report every block-level failure.
    pub fn validate_chain(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (i, block) in self.chain.iter().enumerate() {
            let previous = i.checked_sub(1).and_then(|p| self.chain.get(p));
            if previous.is_none() && block.previous_hash != GENESIS_PARENT_HASH {
                errors.push(format!("Block {i}: Invalid genesis parent hash"));
            }
            if let Err(block_errors) = block.validate(previous) {
                errors.extend(block_errors.iter().map(|e| format!("Block {i}: {e}")));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Inclusion proof for a confirmed transaction.
    pub fn transaction_proof(&self, tx_id: &TxId) -> Option<TransactionProof> {
        self.chain.iter().find_map(|block| {
            let tx_index = block.transaction_index(tx_id)?;
            let merkle_proof = block.transaction_tree().proof(tx_index).ok()?;
            Some(TransactionProof {
                block_hash: block.hash,
                block_index: block.index,
                tx_index,
                merkle_proof,
                merkle_root: block.merkle_root,
            })
        })
    }

    /// Check a proof against the ledger's own copy of the block.
    ///
    /// The transaction hash and Merkle root are taken from the chain, not
    /// from the proof.
    pub fn verify_transaction_proof(&self, tx_id: &TxId, proof: &TransactionProof) -> bool {
        let Some(block) = self.block_by_hash(&proof.block_hash) else {
            return false;
        };
        let Some(tx_index) = block.transaction_index(tx_id) else {
            return false;
        };
        let tx_hash = block.transactions[tx_index].hash();

        tx_index == proof.tx_index
            && proof.merkle_proof.leaf_hash == tx_hash
            && MerkleTree::verify(&tx_hash, &proof.merkle_proof.path, &block.merkle_root)
    }

    pub fn block_by_hash(&self, hash: &Hash) -> Option<&Block> {
        self.chain.iter().find(|b| b.hash == *hash)
    }

    pub fn block_by_index(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    pub fn latest_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Find a confirmed transaction.
    pub fn transaction(&self, tx_id: &TxId) -> Option<TransactionLookup> {
        let height = self.chain.len() as u64;
        self.chain.iter().find_map(|block| {
            let tx_index = block.transaction_index(tx_id)?;
            Some(TransactionLookup {
                transaction: block.transactions[tx_index].clone(),
                block_index: block.index,
                block_hash: block.hash,
                tx_index,
                confirmations: height - block.index,
            })
        })
    }

    /// Where a transaction is in its lifecycle, if known.
    pub fn transaction_status(&self, tx_id: &TxId) -> Option<TransactionStatus> {
        if let Some(position) = self.pool.iter().position(|tx| tx.id == *tx_id) {
            return Some(TransactionStatus::Pending { position });
        }
        self.transaction(tx_id)
            .map(|lookup| TransactionStatus::Confirmed {
                block_index: lookup.block_index,
                confirmations: lookup.confirmations,
            })
    }

    /// Current state root: the head block's committed root.
    pub fn state_root(&self) -> Hash {
        self.chain
            .last()
            .and_then(|b| b.state_root)
            .unwrap_or_else(|| self.state.state_root())
    }

    /// State inclusion proof for `key` under the current root.
    pub fn state_proof(&self, key: &str) -> Option<MerkleProof> {
        self.state.proof_for(key)
    }

    pub fn chain_stats(&self) -> ChainStats {
        ChainStats {
            length: self.chain.len(),
            pending_count: self.pool.len(),
            difficulty: self.config.difficulty,
            last_block_hash: self.chain.last().map_or(GENESIS_PARENT_HASH, |b| b.hash),
        }
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            chain: self.chain_stats(),
            metrics: self.metrics.clone(),
            state: self.state.stats(),
            validators: self.consensus.len(),
            total_stake: self.consensus.total_stake(),
        }
    }

    /// Head commitment for external anchoring.
    pub fn anchor_record(&self) -> AnchorRecord {
        let (block_hash, block_index) = self
            .chain
            .last()
            .map_or((GENESIS_PARENT_HASH, 0), |b| (b.hash, b.index));
        AnchorRecord {
            block_hash,
            block_index,
            state_root: self.state_root(),
            timestamp: self.now(),
            network_id: self.config.network_id.clone(),
        }
    }
}
