use thiserror::Error;

/// Errors raised by Merkle tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("Leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange { index: usize, leaf_count: usize },
}
