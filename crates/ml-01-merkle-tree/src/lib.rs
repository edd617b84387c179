//! # ml-01-merkle-tree
//!
//! Merkle commitment structure shared by the ledger.
//!
//! ## Role in System
//!
//! - **Block commitments**: a block's `merkle_root` is the root over its
//!   transaction hashes (ml-05).
//! - **State commitments**: the state root is the root over sorted
//!   `{key, value}` entries (ml-04).
//! - **Inclusion proofs**: light verification of a single leaf against a root.
//!
//! ## Usage
//!
//! ```rust
//! use ml_01_merkle_tree::MerkleTree;
//!
//! let tree = MerkleTree::build(&[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]);
//! let proof = tree.proof(2).unwrap();
//! assert!(MerkleTree::verify(&proof.leaf_hash, &proof.path, &tree.root()));
//! ```

pub mod domain;

pub use domain::{
    empty_root, hash_leaf, MerkleError, MerkleProof, MerkleTree, ProofNode, SiblingPosition,
    TreeStats,
};
