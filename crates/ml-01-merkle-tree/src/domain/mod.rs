//! Domain layer - pure Merkle commitment logic (no I/O, no async).

pub mod errors;
pub mod proof;
pub mod tree;

pub use errors::*;
pub use proof::*;
pub use tree::*;
