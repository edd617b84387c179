use ml_02_transactions::TransactionKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Invalid {kind} payload: {reason}")]
    InvalidPayload {
        kind: TransactionKind,
        reason: String,
    },

    #[error("Economic transaction has neither sender nor recipient")]
    MissingAccount,

    #[error("Governance vote requires a sender")]
    MissingVoter,

    #[error("Balance overflow on {key}")]
    BalanceOverflow { key: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
