//! Cross-crate integration flows.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod pipeline;
pub mod proofs;
pub mod serialization;
pub mod validators;
