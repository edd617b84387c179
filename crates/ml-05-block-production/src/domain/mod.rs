//! Domain layer - block entity, genesis helpers and proof-of-work.

pub mod block;
pub mod errors;
pub mod genesis;
pub mod mining;

pub use block::*;
pub use errors::*;
pub use genesis::*;
pub use mining::*;
