//! # Inclusion Proofs
//!
//! A proof is the sibling path from a leaf up to (but excluding) the root.
//! It lets a verifier confirm that a leaf belongs to a root without seeing
//! the rest of the tree.

use super::tree::MerkleTree;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// A cryptographic proof of leaf inclusion in a Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Index of the leaf in the original sequence.
    pub leaf_index: usize,
    /// Hash of the leaf being proven.
    #[serde(with = "shared_types::hex_hash")]
    pub leaf_hash: Hash,
    /// Sibling hashes from leaf level to just below the root.
    pub path: Vec<ProofNode>,
}

impl MerkleProof {
    /// Verify this proof's own leaf hash against `root`.
    pub fn verify(&self, root: &Hash) -> bool {
        MerkleTree::verify(&self.leaf_hash, &self.path, root)
    }
}

/// A single node in the proof path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// The sibling hash at this level.
    #[serde(with = "shared_types::hex_hash")]
    pub hash: Hash,
    /// Position of the sibling relative to the running hash.
    pub position: SiblingPosition,
}

/// Position of a sibling in the Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    /// Sibling is hashed first: `H(sibling || acc)`.
    Left,
    /// Sibling is hashed second: `H(acc || sibling)`.
    Right,
}
