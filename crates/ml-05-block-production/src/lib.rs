//! # ml-05-block-production
//!
//! Assembles transactions into blocks and seals them with proof-of-work.
//!
//! ## Block Hash
//!
//! `hash = SHA-256(index ‖ timestamp ‖ previous_hash ‖ merkle_root ‖ nonce ‖ state_root)`
//! using the canonical field encoding from `shared-types`. A block is sealed
//! when its hex hash begins with `difficulty` zero characters.
//!
//! ## Bounded Mining
//!
//! [`Block::mine`] never loops forever: every search takes a
//! [`MiningControl`] carrying an optional attempt limit and a shared
//! [`MiningCancel`] token.

pub mod domain;

pub use domain::{
    genesis_transaction, leading_zero_nibbles, meets_difficulty, reward_transaction, AbortReason,
    Block, BlockStats, BlockValidationError, MiningCancel, MiningControl, MiningError,
    MiningOutcome, GENESIS_PARENT_HASH,
};
