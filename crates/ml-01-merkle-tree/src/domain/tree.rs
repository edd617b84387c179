//! # Merkle Tree
//!
//! ALGORITHM: Binary hash tree where each non-leaf node is the SHA-256 of its
//! two children concatenated: `H(left || right)`.
//!
//! ## Invariants
//!
//! - **Odd Duplication**: A level with an odd number of nodes pairs its last
//!   node with itself. Nodes are never dropped and never padded with sentinels.
//! - **Empty Root**: An empty tree's root is `SHA-256("")`, the hash of the
//!   canonical empty value. It is never a zero sentinel.
//! - **Rebuild Only**: The tree is immutable once built. Adding a leaf means
//!   building a new tree over `leaves + 1`.

use super::errors::MerkleError;
use super::proof::{MerkleProof, ProofNode, SiblingPosition};
use rayon::prelude::*;
use serde::Serialize;
use shared_crypto::{sha256, sha256_pair};
use shared_types::Hash;

/// Leaf count from which leaf hashing is spread across the rayon pool.
pub const PARALLEL_HASH_THRESHOLD: usize = 1024;

/// Root of a tree with no leaves: `SHA-256("")`.
pub fn empty_root() -> Hash {
    sha256(b"")
}

/// Hash a raw leaf value into its leaf hash.
#[inline]
pub fn hash_leaf(leaf: &[u8]) -> Hash {
    sha256(leaf)
}

/// A binary Merkle tree holding every level from leaves to root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaf hashes, the last level holds the root.
    /// Empty when the tree has no leaves.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree over raw leaf values. Each leaf is hashed first.
    pub fn build<L>(leaves: &[L]) -> Self
    where
        L: AsRef<[u8]> + Sync,
    {
        let leaf_hashes: Vec<Hash> = if leaves.len() >= PARALLEL_HASH_THRESHOLD {
            leaves.par_iter().map(|l| hash_leaf(l.as_ref())).collect()
        } else {
            leaves.iter().map(|l| hash_leaf(l.as_ref())).collect()
        };
        Self::from_leaf_hashes(leaf_hashes)
    }

    /// Build a tree over leaves that are already hashed.
    pub fn from_leaf_hashes(leaf_hashes: Vec<Hash>) -> Self {
        if leaf_hashes.is_empty() {
            return Self { levels: Vec::new() };
        }

        let mut levels = Vec::new();
        let mut current = leaf_hashes;

        while current.len() > 1 {
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    sha256_pair(left, right)
                })
                .collect();
            levels.push(std::mem::replace(&mut current, next));
        }
        levels.push(current);

        Self { levels }
    }

    /// Get the root hash, or [`empty_root`] for an empty tree.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_else(empty_root)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of levels including leaves and root (0 when empty).
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Leaf hash at `index`.
    pub fn leaf_hash(&self, index: usize) -> Option<Hash> {
        self.levels.first().and_then(|leaves| leaves.get(index)).copied()
    }

    /// Generate an inclusion proof for the leaf at `leaf_index`.
    ///
    /// One [`ProofNode`] is recorded per level below the root. When a node has
    /// no right neighbour the node itself is recorded as its sibling, mirroring
    /// the duplication performed at build time.
    pub fn proof(&self, leaf_index: usize) -> Result<MerkleProof, MerkleError> {
        let leaf_hash = self
            .leaf_hash(leaf_index)
            .ok_or(MerkleError::IndexOutOfRange {
                index: leaf_index,
                leaf_count: self.leaf_count(),
            })?;

        let below_root = self
            .levels
            .split_last()
            .map_or(&[][..], |(_, rest)| rest);

        let mut path = Vec::with_capacity(below_root.len());
        let mut idx = leaf_index;

        for level in below_root {
            let (sibling_idx, position) = if idx % 2 == 1 {
                (idx - 1, SiblingPosition::Left)
            } else if idx + 1 < level.len() {
                (idx + 1, SiblingPosition::Right)
            } else {
                (idx, SiblingPosition::Right)
            };

            path.push(ProofNode {
                hash: level[sibling_idx],
                position,
            });

            idx /= 2;
        }

        Ok(MerkleProof {
            leaf_index,
            leaf_hash,
            path,
        })
    }

    /// Verify an inclusion path against an expected root.
    ///
    /// Pure: folds the path left to right and compares the result.
    pub fn verify(leaf_hash: &Hash, path: &[ProofNode], expected_root: &Hash) -> bool {
        let computed = path.iter().fold(*leaf_hash, |acc, node| match node.position {
            SiblingPosition::Left => sha256_pair(&node.hash, &acc),
            SiblingPosition::Right => sha256_pair(&acc, &node.hash),
        });
        computed == *expected_root
    }

    /// Tree statistics.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            leaf_count: self.leaf_count(),
            height: self.height(),
            root: self.root(),
        }
    }
}

/// Summary of a tree's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Number of leaves.
    pub leaf_count: usize,
    /// Number of levels.
    pub height: usize,
    /// Root hash.
    #[serde(with = "shared_types::hex_hash")]
    pub root: Hash,
}
