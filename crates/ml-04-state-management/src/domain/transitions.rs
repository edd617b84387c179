//! # State Transitions
//!
//! Parses a transaction's opaque payload into a typed transition and derives
//! the state key it writes to.
//!
//! | Kind | Key | Rule |
//! |------|-----|------|
//! | identity | `identity:<did>` | create / update / revoke |
//! | economic | `balance:<sender>` (or `<recipient>` when senderless) | credit adds; debit and transfer subtract |
//! | governance | `vote:<proposalId>` | one vote per sender |
//! | audit | `audit:<entityId>` | append event |
//! | generic | `generic:<tx id>` | store payload |

use super::errors::StateError;
use super::values::{AuditEvent, AuditLog, Balance, IdentityRecord, StateValue, VoteTally};
use ml_02_transactions::{Transaction, TransactionKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::{to_hex, Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityAction {
    Create,
    Update,
    Revoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EconomicAction {
    Credit,
    Debit,
    /// Debits the sender only. The matching credit to the recipient must be
    /// submitted as its own transaction.
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityPayload {
    did: String,
    action: IdentityAction,
    #[serde(default)]
    public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EconomicPayload {
    action: EconomicAction,
    /// Whole units only.
    amount: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GovernancePayload {
    proposal_id: String,
    vote: VoteChoice,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditPayload {
    entity_id: String,
    event_type: String,
    #[serde(default)]
    details: serde_json::Value,
}

/// A parsed, typed state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Identity {
        did: String,
        action: IdentityAction,
        public_key: Option<String>,
    },
    Economic {
        account: Address,
        action: EconomicAction,
        amount: u64,
    },
    Governance {
        proposal_id: String,
        voter: Address,
        vote: VoteChoice,
    },
    Audit {
        entity_id: String,
        event_type: String,
        details: serde_json::Value,
    },
    Generic,
}

fn parse_payload<T: DeserializeOwned>(tx: &Transaction) -> Result<T, StateError> {
    T::deserialize(&tx.payload).map_err(|e| StateError::InvalidPayload {
        kind: tx.kind,
        reason: e.to_string(),
    })
}

impl Transition {
    /// Parse the transition encoded in `tx`.
    pub fn parse(tx: &Transaction) -> Result<Self, StateError> {
        match tx.kind {
            TransactionKind::Identity => {
                let p: IdentityPayload = parse_payload(tx)?;
                Ok(Self::Identity {
                    did: p.did,
                    action: p.action,
                    public_key: p.public_key,
                })
            }
            TransactionKind::Economic => {
                let p: EconomicPayload = parse_payload(tx)?;
                let account = tx
                    .sender
                    .clone()
                    .or_else(|| tx.recipient.clone())
                    .ok_or(StateError::MissingAccount)?;
                Ok(Self::Economic {
                    account,
                    action: p.action,
                    amount: p.amount,
                })
            }
            TransactionKind::Governance => {
                let p: GovernancePayload = parse_payload(tx)?;
                let voter = tx.sender.clone().ok_or(StateError::MissingVoter)?;
                Ok(Self::Governance {
                    proposal_id: p.proposal_id,
                    voter,
                    vote: p.vote,
                })
            }
            TransactionKind::Audit => {
                let p: AuditPayload = parse_payload(tx)?;
                Ok(Self::Audit {
                    entity_id: p.entity_id,
                    event_type: p.event_type,
                    details: p.details,
                })
            }
            TransactionKind::Generic => Ok(Self::Generic),
        }
    }

    /// State key written by this transition.
    pub fn key(&self, tx: &Transaction) -> String {
        match self {
            Self::Identity { did, .. } => format!("identity:{did}"),
            Self::Economic { account, .. } => format!("balance:{account}"),
            Self::Governance { proposal_id, .. } => format!("vote:{proposal_id}"),
            Self::Audit { entity_id, .. } => format!("audit:{entity_id}"),
            Self::Generic => format!("generic:{}", to_hex(&tx.id)),
        }
    }

    /// Compute the value that replaces `current`.
    pub fn next_value(
        &self,
        tx: &Transaction,
        current: Option<&StateValue>,
        currency: &str,
    ) -> Result<StateValue, StateError> {
        match self {
            Self::Identity {
                did,
                action,
                public_key,
            } => {
                let mut record = current
                    .and_then(StateValue::as_identity)
                    .cloned()
                    .unwrap_or_else(|| IdentityRecord::new(did.clone()));
                match action {
                    IdentityAction::Create => {
                        record.public_key = public_key.clone();
                        record.created = Some(tx.timestamp);
                    }
                    IdentityAction::Update => {
                        record.public_key = public_key.clone();
                        record.updated = Some(tx.timestamp);
                    }
                    IdentityAction::Revoke => {
                        record.revoked = true;
                        record.updated = Some(tx.timestamp);
                    }
                }
                Ok(StateValue::Identity(record))
            }
            Self::Economic {
                account,
                action,
                amount,
            } => {
                let mut balance = current
                    .and_then(StateValue::as_balance)
                    .cloned()
                    .unwrap_or_else(|| Balance {
                        amount: 0,
                        currency: currency.to_string(),
                        last_updated: tx.timestamp,
                    });
                let overflow = || StateError::BalanceOverflow {
                    key: format!("balance:{account}"),
                };
                let delta = i64::try_from(*amount).map_err(|_| overflow())?;
                balance.amount = match action {
                    EconomicAction::Credit => balance.amount.checked_add(delta),
                    EconomicAction::Debit | EconomicAction::Transfer => {
                        balance.amount.checked_sub(delta)
                    }
                }
                .ok_or_else(overflow)?;
                balance.last_updated = tx.timestamp;
                Ok(StateValue::Balance(balance))
            }
            Self::Governance {
                proposal_id,
                voter,
                vote,
            } => {
                let mut tally = current
                    .and_then(StateValue::as_votes)
                    .cloned()
                    .unwrap_or_else(|| VoteTally::new(proposal_id.clone()));
                if tally.voters.insert(voter.clone()) {
                    match vote {
                        VoteChoice::Yes => tally.yes += 1,
                        VoteChoice::No => tally.no += 1,
                        VoteChoice::Abstain => tally.abstain += 1,
                    }
                }
                Ok(StateValue::Votes(tally))
            }
            Self::Audit {
                entity_id,
                event_type,
                details,
            } => {
                let mut log = current
                    .and_then(StateValue::as_audit)
                    .cloned()
                    .unwrap_or_else(|| AuditLog {
                        entity_id: entity_id.clone(),
                        events: Vec::new(),
                    });
                log.events.push(AuditEvent {
                    event_id: tx.id,
                    event_type: event_type.clone(),
                    timestamp: tx.timestamp,
                    details: details.clone(),
                });
                Ok(StateValue::Audit(log))
            }
            Self::Generic => Ok(StateValue::Generic(tx.payload.clone())),
        }
    }
}
