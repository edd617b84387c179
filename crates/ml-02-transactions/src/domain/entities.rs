//! # Transaction Entity
//!
//! A transaction is a signed, typed unit of intent.
//!
//! ## Identity vs. Content
//!
//! - `id` is derived from `timestamp || random salt`, never from the payload,
//!   so two transactions with identical payloads stay distinguishable.
//! - `hash()` commits to every field *including* the signature. This is the
//!   value fed into block Merkle trees, so signing changes the hash.
//! - The signature covers every field *except* itself.

use super::errors::TransactionValidationError;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    hex_hash, short_hex, Address, CanonicalEncoder, Hash, SystemTimeSource, TimeSource,
    Timestamp, ZERO_HASH,
};
use std::fmt;

/// Transaction identifier.
pub type TxId = Hash;

/// Kind of a transaction. Determines the state key and transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// DID lifecycle: create / update / revoke.
    Identity,
    /// Balance movement: credit / debit / transfer.
    Economic,
    /// Proposal vote.
    Governance,
    /// Append-only audit event.
    Audit,
    /// Anything else; stored verbatim.
    Generic,
}

impl TransactionKind {
    /// Stable lowercase tag used in canonical encodings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Economic => "economic",
            Self::Governance => "governance",
            Self::Audit => "audit",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Content-independent identifier.
    #[serde(with = "hex_hash")]
    pub id: TxId,
    /// Creation time (Unix millis).
    pub timestamp: Timestamp,
    /// Transaction type.
    pub kind: TransactionKind,
    /// Originating account. Requires a signature when present.
    pub sender: Option<Address>,
    /// Receiving account.
    pub recipient: Option<Address>,
    /// Opaque payload interpreted by the state transition for `kind`.
    pub payload: serde_json::Value,
    /// Ed25519 signature over [`Transaction::signing_bytes`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Ed25519Signature>,
}

impl Transaction {
    /// Create a transaction stamped with the system clock.
    pub fn create(
        kind: TransactionKind,
        sender: Option<Address>,
        recipient: Option<Address>,
        payload: serde_json::Value,
    ) -> Self {
        Self::create_at(&SystemTimeSource, kind, sender, recipient, payload)
    }

    /// Create a transaction stamped with the given clock.
    pub fn create_at(
        clock: &dyn TimeSource,
        kind: TransactionKind,
        sender: Option<Address>,
        recipient: Option<Address>,
        payload: serde_json::Value,
    ) -> Self {
        let timestamp = clock.now_millis();
        Self {
            id: Self::generate_id(timestamp),
            timestamp,
            kind,
            sender,
            recipient,
            payload,
            signature: None,
        }
    }

    /// `SHA-256(timestamp || 16 random bytes)`.
    fn generate_id(timestamp: Timestamp) -> TxId {
        let salt: [u8; 16] = rand::random();
        sha256(&CanonicalEncoder::new().u64(timestamp).bytes(&salt).finish())
    }

    /// Canonical bytes covered by the signature (signature excluded).
    pub fn signing_bytes(&self) -> Vec<u8> {
        self.encode_fields().finish()
    }

    fn encode_fields(&self) -> CanonicalEncoder {
        CanonicalEncoder::new()
            .hash(&self.id)
            .u64(self.timestamp)
            .str(self.kind.as_str())
            .opt_str(self.sender.as_deref())
            .opt_str(self.recipient.as_deref())
            .json(&self.payload)
    }

    /// Sign the transaction, replacing any previous signature.
    pub fn sign(&mut self, keypair: &Ed25519KeyPair) {
        self.signature = Some(keypair.sign(&self.signing_bytes()));
    }

    /// Verify the stored signature. Fails closed when unsigned.
    pub fn verify_signature(&self, public_key: &Ed25519PublicKey) -> bool {
        match &self.signature {
            Some(signature) => public_key
                .verify(&self.signing_bytes(), signature)
                .is_ok(),
            None => false,
        }
    }

    /// Whether a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Canonical hash over all fields including the signature.
    pub fn hash(&self) -> Hash {
        let bytes = self
            .encode_fields()
            .opt_bytes(self.signature.as_ref().map(|s| s.as_bytes().as_slice()))
            .finish();
        sha256(&bytes)
    }

    /// Numeric `payload.amount`, if any.
    pub fn amount(&self) -> Option<f64> {
        self.payload.get("amount").and_then(serde_json::Value::as_f64)
    }

    /// Check structural validity, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<TransactionValidationError>> {
        let mut errors = Vec::new();

        if self.id == ZERO_HASH {
            errors.push(TransactionValidationError::MissingId);
        }

        if self.timestamp == 0 {
            errors.push(TransactionValidationError::MissingTimestamp);
        }

        if self.payload.is_null() {
            errors.push(TransactionValidationError::MissingPayload);
        }

        if self.sender.is_some() && self.signature.is_none() {
            errors.push(TransactionValidationError::MissingSignature);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, short_hex(&self.id))
    }
}
