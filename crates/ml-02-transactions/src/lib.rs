//! # ml-02-transactions
//!
//! Typed, optionally signed units of intent submitted to the ledger.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──→ (sign) ──→ submit ──→ pool ──→ included in block ──→ confirmed
//! ```
//!
//! Once included in a block a transaction is immutable history.
//!
//! ## Invariants
//!
//! - A transaction with a sender must carry a signature before admission.
//! - `hash()` is stable across JSON round trips.

pub mod domain;

pub use domain::{join_errors, Transaction, TransactionKind, TransactionValidationError, TxId};
