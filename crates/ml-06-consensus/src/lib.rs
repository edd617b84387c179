//! # ml-06-consensus
//!
//! Stake-weighted validator selection with reputation tracking, kept apart
//! from block production for a future multi-producer mode.
//!
//! ## Invariants
//!
//! - Reputation stays in `[0, 1]`: +0.01 per valid proposal, -0.1 per
//!   invalid one.
//! - Selection probability is proportional to stake alone.

pub mod domain;

pub use domain::{ConsensusEngine, ValidatorRecord, REPUTATION_PENALTY, REPUTATION_REWARD};
