//! Outbound events (published on the ledger's broadcast channel)

use ml_02_transactions::TransactionKind;
use serde::Serialize;
use shared_types::{hex_hash, Hash};

/// Notification emitted by the ledger after a state change.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Transaction admitted to the pool
    TransactionAccepted {
        #[serde(with = "hex_hash")]
        tx_id: Hash,
        kind: TransactionKind,
        risk_score: f64,
    },

    /// Transaction refused at submission
    TransactionRejected {
        #[serde(with = "hex_hash")]
        tx_id: Hash,
        reason: String,
    },

    /// Block validated and appended
    BlockAppended {
        index: u64,
        #[serde(with = "hex_hash")]
        hash: Hash,
        transaction_count: usize,
        #[serde(with = "hex_hash")]
        state_root: Hash,
    },

    /// Sealed block failed validation and was discarded
    BlockRejected { index: u64, errors: Vec<String> },

    /// Nonce search stopped; drained transactions were re-queued
    MiningAborted { index: u64, requeued: usize },

    /// Automatic production after a submission failed
    AutoProductionFailed { error: String },

    /// Chain and state replaced from a snapshot
    SnapshotImported {
        length: usize,
        #[serde(with = "hex_hash")]
        head: Hash,
    },
}
