//! # Proof-of-Work Controls
//!
//! The nonce search is bounded: it stops on a tripped [`MiningCancel`] or
//! after `max_attempts` hashes, whichever comes first.

use serde::Serialize;
use shared_types::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation token shared between a miner and its owner.
#[derive(Debug, Clone, Default)]
pub struct MiningCancel(Arc<AtomicBool>);

impl MiningCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Limits applied to a single nonce search.
#[derive(Debug, Clone, Default)]
pub struct MiningControl {
    /// Give up after this many hashes. `None` = only stop on cancellation.
    pub max_attempts: Option<u64>,
    pub cancel: MiningCancel,
}

impl MiningControl {
    pub fn new(max_attempts: Option<u64>, cancel: MiningCancel) -> Self {
        Self {
            max_attempts,
            cancel,
        }
    }

    pub fn with_max_attempts(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            cancel: MiningCancel::new(),
        }
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MiningOutcome {
    pub nonce: u64,
    #[serde(with = "shared_types::hex_hash")]
    pub hash: Hash,
    pub attempts: u64,
    pub elapsed_ms: u64,
}

impl MiningOutcome {
    /// Hashes per second for this search.
    pub fn hash_rate(&self) -> f64 {
        if self.elapsed_ms == 0 {
            self.attempts as f64 * 1_000.0
        } else {
            self.attempts as f64 * 1_000.0 / self.elapsed_ms as f64
        }
    }
}

/// Number of leading `0` hex characters in `hash`.
pub fn leading_zero_nibbles(hash: &Hash) -> u32 {
    let mut count = 0;
    for byte in hash {
        if *byte == 0 {
            count += 2;
            continue;
        }
        if byte >> 4 == 0 {
            count += 1;
        }
        break;
    }
    count
}

/// Whether `hash` starts with at least `difficulty` zero hex characters.
pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    leading_zero_nibbles(hash) >= difficulty
}
