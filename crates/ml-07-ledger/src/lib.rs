//! # ml-07-ledger
//!
//! The Merkle-anchored ledger: pending pool, proof-of-work chain and
//! committed state, with fraud screening at the door.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  LedgerService (async, Arc<RwLock<Ledger>>)  │  ← implements LedgerApi
//! └──────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────────────────────────┐
//! │  Ledger (single writer, &mut self)           │
//! │  ml-02 tx → ml-03 fraud → pool               │
//! │  pool → ml-04 staged state → ml-05 block     │
//! │  ml-01 proofs, ml-06 validator registry      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Every appended block validates against its predecessor.
//! - Each block's `state_root` is the root of state after its transactions.
//! - A block that is rejected or aborted leaves committed state untouched.
//! - Snapshot import is all-or-nothing.

pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod snapshot;

pub use config::{FraudConfig, LedgerConfig, MiningConfig, StateConfig};
pub use error::{LedgerError, Result};
pub use events::LedgerEvent;
pub use ledger::{
    AnchorRecord, ChainStats, Ledger, LedgerStats, PendingBlock, TransactionLookup,
    TransactionProof, TransactionStatus,
};
pub use metrics::LedgerMetrics;
pub use ml_02_transactions::{Transaction, TransactionKind, TxId};
pub use ports::LedgerApi;
pub use service::LedgerService;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
