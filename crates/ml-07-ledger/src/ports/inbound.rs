//! Inbound ports (driving side - API)
//!
//! The only surface external collaborators (REST layer, orchestrators, UI)
//! use to reach the ledger.

use crate::error::Result;
use crate::ledger::{ChainStats, TransactionProof};
use async_trait::async_trait;
use ml_02_transactions::{TransactionKind, TxId};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Address, Hash};

/// Primary port: ledger access for external collaborators
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Create, optionally sign, and submit a transaction
    async fn submit_transaction(
        &self,
        kind: TransactionKind,
        sender: Option<Address>,
        recipient: Option<Address>,
        payload: serde_json::Value,
        signer: Option<&Ed25519KeyPair>,
    ) -> Result<TxId>;

    /// Current state root
    async fn get_state_root(&self) -> Hash;

    /// Inclusion proof for a confirmed transaction (`NotFound` otherwise)
    async fn get_transaction_proof(&self, tx_id: &TxId) -> Result<TransactionProof>;

    /// Chain summary
    async fn get_chain_stats(&self) -> ChainStats;
}
