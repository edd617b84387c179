//! # ml-04-state-management
//!
//! Keyed application state, re-committed into a Merkle root after every
//! transaction.
//!
//! ## Role in System
//!
//! ```text
//! [Ledger (7)] ──apply(tx)──→ [StateManager] ──state_root──→ [Block (5)]
//! ```
//!
//! The ledger applies a block's transactions to a *clone* of the manager and
//! swaps it in only once the block is appended, so a rejected block never
//! leaks into committed state.

pub mod config;
pub mod domain;

pub use config::StateConfig;
pub use domain::*;
