//! Shared builders for integration tests.

use ml_02_transactions::{Transaction, TransactionKind};
use ml_07_ledger::{Ledger, LedgerConfig};
use serde_json::{json, Value};
use shared_crypto::Ed25519KeyPair;
use shared_types::ManualTimeSource;
use std::sync::Arc;

pub const START: u64 = 1_700_000_000_000;

pub fn config(batch_size: usize) -> LedgerConfig {
    LedgerConfig {
        difficulty: 1,
        batch_size,
        ..LedgerConfig::default()
    }
}

pub fn ledger(batch_size: usize) -> (Ledger, ManualTimeSource) {
    let clock = ManualTimeSource::new(START);
    let ledger = Ledger::with_time_source(config(batch_size), Arc::new(clock.clone()))
        .expect("test ledger");
    (ledger, clock)
}

pub fn keypair() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([9; 32])
}

pub fn unsigned(
    clock: &ManualTimeSource,
    kind: TransactionKind,
    recipient: Option<&str>,
    payload: Value,
) -> Transaction {
    Transaction::create_at(clock, kind, None, recipient.map(str::to_string), payload)
}

pub fn signed(
    clock: &ManualTimeSource,
    kind: TransactionKind,
    sender: &str,
    payload: Value,
) -> Transaction {
    let mut tx = Transaction::create_at(clock, kind, Some(sender.to_string()), None, payload);
    tx.sign(&keypair());
    tx
}

pub fn note(clock: &ManualTimeSource, n: u64) -> Transaction {
    unsigned(clock, TransactionKind::Generic, None, json!({ "note": n }))
}
