use serde::Serialize;
use shared_types::{to_hex, Hash};
use thiserror::Error;

/// Why a nonce search stopped without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The cancellation token was tripped.
    Cancelled,
    /// `max_attempts` hashes were tried.
    MaxAttempts,
    /// The nonce reached `u64::MAX`.
    NonceSpaceExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("Mining aborted after {attempts} attempts: {reason:?}")]
    Aborted { attempts: u64, reason: AbortReason },

    #[error("Block {index} has no state root; assign it before mining")]
    MissingStateRoot { index: u64 },
}

/// A single failed block check. `Block::validate` reports all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockValidationError {
    #[error("Invalid block hash: stored {}, computed {}", to_hex(.stored), to_hex(.computed))]
    HashMismatch { stored: Hash, computed: Hash },

    #[error("Invalid previous hash: expected {}, found {}", to_hex(.expected), to_hex(.found))]
    PreviousHashMismatch { expected: Hash, found: Hash },

    #[error("Invalid block index: expected {expected}, found {found}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("Invalid merkle root: stored {}, computed {}", to_hex(.stored), to_hex(.computed))]
    MerkleRootMismatch { stored: Hash, computed: Hash },

    #[error("Invalid transaction {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },

    #[error("Block has no state root")]
    MissingStateRoot,

    #[error("Block hash does not meet difficulty {difficulty}")]
    InsufficientWork { difficulty: u32 },
}
