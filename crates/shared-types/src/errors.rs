//! # Error Types
//!
//! Errors shared by the primitive helpers in this crate.

use thiserror::Error;

/// Failure to parse a hex-encoded hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    /// Input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length is not 32.
    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
