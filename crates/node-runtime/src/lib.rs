//! # Node Runtime Library
//!
//! Configuration loading and lifecycle for a ledger node. The entry point is
//! the `main.rs` binary; the modules are exposed for tests.

pub mod config;
pub mod runtime;

pub use config::NodeConfig;
pub use runtime::{read_snapshot, write_snapshot, NodeRuntime};
