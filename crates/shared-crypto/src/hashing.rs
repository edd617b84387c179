//! # SHA-256 Hashing
//!
//! Every commitment in the ledger (leaf hashes, Merkle nodes, transaction
//! ids and hashes, block seals) is SHA-256.

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared_types::{canonical_json, Hash};

/// Hash data with SHA-256 (one-shot).
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Hash the concatenation `left || right`.
#[inline]
pub fn sha256_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// SHA-256 of a value's canonical JSON encoding.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<Hash, serde_json::Error> {
    Ok(sha256(&canonical_json(value)?))
}
