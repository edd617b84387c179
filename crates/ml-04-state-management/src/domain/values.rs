//! Typed state values stored under derived keys.

use serde::{Deserialize, Serialize};
use shared_types::{hex_hash, Address, Hash, Timestamp};
use std::collections::BTreeSet;

/// Value stored under a state key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    Identity(IdentityRecord),
    Balance(Balance),
    Votes(VoteTally),
    Audit(AuditLog),
    Generic(serde_json::Value),
}

impl StateValue {
    pub fn as_balance(&self) -> Option<&Balance> {
        match self {
            Self::Balance(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_identity(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Identity(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_votes(&self) -> Option<&VoteTally> {
        match self {
            Self::Votes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_audit(&self) -> Option<&AuditLog> {
        match self {
            Self::Audit(a) => Some(a),
            _ => None,
        }
    }
}

/// DID lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub did: String,
    pub public_key: Option<String>,
    pub created: Option<Timestamp>,
    pub updated: Option<Timestamp>,
    pub revoked: bool,
}

impl IdentityRecord {
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            public_key: None,
            created: None,
            updated: None,
            revoked: false,
        }
    }
}

/// Account balance. Signed: a debit may take it below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: i64,
    pub currency: String,
    pub last_updated: Timestamp,
}

/// Vote counts for one proposal. Each voter counts once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub proposal_id: String,
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub voters: BTreeSet<Address>,
}

impl VoteTally {
    pub fn new(proposal_id: impl Into<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            yes: 0,
            no: 0,
            abstain: 0,
            voters: BTreeSet::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.yes + self.no + self.abstain
    }
}

/// Append-only event log for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub entity_id: String,
    pub events: Vec<AuditEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Id of the transaction that recorded the event.
    #[serde(with = "hex_hash")]
    pub event_id: Hash,
    pub event_type: String,
    pub timestamp: Timestamp,
    pub details: serde_json::Value,
}
