//! Error types for the ledger

use ml_02_transactions::{join_errors, TransactionValidationError};
use ml_04_state_management::StateError;
use ml_05_block_production::MiningError;
use shared_types::{to_hex, Hash};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors returned by ledger operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed or incomplete transaction
    #[error("Transaction validation failed: {}", join_errors(.0))]
    Validation(Vec<TransactionValidationError>),

    /// Payload does not describe a valid state transition
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] StateError),

    /// Policy veto from fraud detection
    #[error("Transaction rejected: {} (risk {risk_score:.2})", .reasons.join(", "))]
    FraudRejected {
        /// Reasons from the vetoing checks
        reasons: Vec<String>,
        /// Overall risk score
        risk_score: f64,
    },

    /// Hash, link or Merkle mismatch
    #[error("Chain integrity violation: {}", .0.join("; "))]
    ChainIntegrity(Vec<String>),

    /// Unknown id or key
    #[error("Not found: {0}")]
    NotFound(String),

    /// `produce_block` called with an empty pool
    #[error("No pending transactions")]
    NoPendingTransactions,

    /// Every drained transaction failed to apply; nothing left to seal
    #[error("Batch discarded: {dropped} transactions failed to apply")]
    BatchDiscarded {
        /// Transactions dropped from the pool
        dropped: usize,
    },

    /// Nonce search stopped before finding a seal
    #[error("Mining aborted: {0}")]
    MiningAborted(#[from] MiningError),

    /// The chain head moved while a block was being mined
    #[error("Stale block: built on {}, head is {}", to_hex(.expected_parent), to_hex(.head))]
    StaleBlock {
        /// Parent the block was built on
        expected_parent: Hash,
        /// Current head
        head: Hash,
    },

    /// Snapshot encoding or decoding failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Background task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Check if error is recoverable (caller may retry or resubmit)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation(_)
                | LedgerError::InvalidPayload(_)
                | LedgerError::FraudRejected { .. }
                | LedgerError::NotFound(_)
                | LedgerError::NoPendingTransactions
                | LedgerError::BatchDiscarded { .. }
                | LedgerError::MiningAborted(_)
                | LedgerError::StaleBlock { .. }
        )
    }
}
