//! # State Manager
//!
//! Keyed application state committed into a Merkle root.
//!
//! ## Invariants
//!
//! - After every successful [`StateManager::apply`] the state tree is rebuilt
//!   over `{key, value}` leaves in key order, so [`StateManager::state_root`]
//!   always reflects the current map.
//! - A failed `apply` leaves the map, tree and history unchanged.
//! - The provenance history is a ring buffer; the oldest entries are evicted
//!   once `history_capacity` is reached.

use super::errors::StateError;
use super::transitions::Transition;
use super::values::StateValue;
use crate::config::StateConfig;
use ml_01_merkle_tree::{empty_root, MerkleProof, MerkleTree};
use ml_02_transactions::Transaction;
use serde::{Deserialize, Serialize};
use shared_crypto::canonical_hash;
use shared_types::{hex_hash, Hash, Timestamp};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace};

/// One recorded state mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Transaction that caused the change.
    #[serde(with = "hex_hash")]
    pub tx_id: Hash,
    pub key: String,
    pub previous: Option<StateValue>,
    pub new: StateValue,
    pub timestamp: Timestamp,
    /// State root right after the change.
    #[serde(with = "hex_hash")]
    pub state_root: Hash,
}

/// State summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateStats {
    pub entry_count: usize,
    pub history_len: usize,
    pub total_applied: u64,
    #[serde(with = "hex_hash")]
    pub state_root: Hash,
}

#[derive(Serialize)]
struct StateLeaf<'a> {
    key: &'a str,
    value: &'a StateValue,
}

/// Leaf hash of a `{key, value}` pair.
pub fn state_leaf_hash(key: &str, value: &StateValue) -> Result<Hash, StateError> {
    Ok(canonical_hash(&StateLeaf { key, value })?)
}

/// Keyed state with a Merkle commitment and provenance log.
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    config: StateConfig,
    entries: BTreeMap<String, StateValue>,
    tree: MerkleTree,
    history: VecDeque<StateChange>,
    total_applied: u64,
}

impl StateManager {
    pub fn new(config: StateConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// State key `tx` writes to.
    pub fn key_for(tx: &Transaction) -> Result<String, StateError> {
        Ok(Transition::parse(tx)?.key(tx))
    }

    /// Check that `tx` carries a well-formed transition without applying it.
    pub fn check_transition(tx: &Transaction) -> Result<(), StateError> {
        Transition::parse(tx).map(|_| ())
    }

    /// Apply a transaction and re-commit the state tree.
    pub fn apply(&mut self, tx: &Transaction) -> Result<StateChange, StateError> {
        let transition = Transition::parse(tx)?;
        let key = transition.key(tx);
        let previous = self.entries.get(&key).cloned();
        let new = transition.next_value(tx, previous.as_ref(), &self.config.currency)?;

        self.entries.insert(key.clone(), new.clone());
        let tree = match self.build_tree() {
            Ok(tree) => tree,
            Err(e) => {
                match &previous {
                    Some(value) => self.entries.insert(key, value.clone()),
                    None => self.entries.remove(&key),
                };
                return Err(e);
            }
        };
        self.tree = tree;
        self.total_applied += 1;

        let change = StateChange {
            tx_id: tx.id,
            key,
            previous,
            new,
            timestamp: tx.timestamp,
            state_root: self.tree.root(),
        };
        trace!("[ml-04] {} -> {}", tx, change.key);
        self.record(change.clone());

        Ok(change)
    }

    fn build_tree(&self) -> Result<MerkleTree, StateError> {
        let leaves = self
            .entries
            .iter()
            .map(|(key, value)| state_leaf_hash(key, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MerkleTree::from_leaf_hashes(leaves))
    }

    fn record(&mut self, change: StateChange) {
        if self.config.history_capacity == 0 {
            return;
        }
        while self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(change);
    }

    /// Current state root (`SHA-256("")` when empty).
    pub fn state_root(&self) -> Hash {
        if self.entries.is_empty() {
            empty_root()
        } else {
            self.tree.root()
        }
    }

    /// Inclusion proof for `key`, or `None` if absent.
    pub fn proof_for(&self, key: &str) -> Option<MerkleProof> {
        let index = self.entries.keys().position(|k| k == key)?;
        self.tree.proof(index).ok()
    }

    /// Verify that `{key, value}` is committed under `root`.
    pub fn verify(key: &str, value: &StateValue, proof: &MerkleProof, root: &Hash) -> bool {
        match state_leaf_hash(key, value) {
            Ok(leaf) => MerkleTree::verify(&leaf, &proof.path, root),
            Err(_) => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(key)
    }

    /// Balance of an account, 0 if it has never been touched.
    pub fn balance(&self, address: &str) -> i64 {
        self.entries
            .get(&format!("balance:{address}"))
            .and_then(StateValue::as_balance)
            .map_or(0, |b| b.amount)
    }

    pub fn entries(&self) -> &BTreeMap<String, StateValue> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retained mutations, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StateChange> {
        self.history.iter()
    }

    /// Retained mutations of one key, oldest first.
    pub fn history_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a StateChange> + 'a {
        self.history.iter().filter(move |c| c.key == key)
    }

    pub fn stats(&self) -> StateStats {
        StateStats {
            entry_count: self.entries.len(),
            history_len: self.history.len(),
            total_applied: self.total_applied,
            state_root: self.state_root(),
        }
    }

    /// Drop all state. Used before replaying a chain.
    pub fn reset(&mut self) {
        debug!("[ml-04] Resetting state ({} entries)", self.entries.len());
        self.entries.clear();
        self.tree = MerkleTree::default();
        self.history.clear();
        self.total_applied = 0;
    }
}
