//! Transaction validation errors.

use serde::Serialize;
use thiserror::Error;

/// A single structural violation found by `Transaction::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum TransactionValidationError {
    #[error("Transaction ID is required")]
    MissingId,

    #[error("Timestamp is required")]
    MissingTimestamp,

    #[error("Transaction payload is required")]
    MissingPayload,

    #[error("Signed transactions must have a signature")]
    MissingSignature,
}

/// Join a list of validation errors into one line.
pub fn join_errors(errors: &[TransactionValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
