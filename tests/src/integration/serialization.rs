//! # Wire Stability
//!
//! JSON round trips must not change anything that is hashed, and the
//! exported formats must keep their field layout.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{self, note, signed};
    use ml_02_transactions::{Transaction, TransactionKind};
    use ml_04_state_management::StateValue;
    use ml_05_block_production::Block;
    use ml_07_ledger::{LedgerEvent, LedgerSnapshot};
    use proptest::prelude::*;
    use serde_json::json;
    use shared_types::to_hex;

    #[test]
    fn test_signed_transaction_hash_survives_json() {
        let clock = shared_types::ManualTimeSource::new(fixtures::START);
        let tx = signed(
            &clock,
            TransactionKind::Economic,
            "alice",
            json!({ "action": "transfer", "amount": 12, "memo": { "b": 1, "a": [1, 2] } }),
        );

        let encoded = serde_json::to_string(&tx).unwrap();
        let decoded: Transaction = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.hash(), tx.hash());
        assert_eq!(decoded.signing_bytes(), tx.signing_bytes());
        assert!(decoded.verify_signature(&fixtures::keypair().public_key()));

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["kind"], "economic");
        assert_eq!(value["id"], to_hex(&tx.id));
    }

    #[test]
    fn test_block_hash_survives_json() {
        let (mut ledger, clock) = fixtures::ledger(2);
        ledger.submit(note(&clock, 1)).unwrap();
        ledger
            .submit(signed(
                &clock,
                TransactionKind::Governance,
                "carol",
                json!({ "proposalId": "p-9", "vote": "abstain" }),
            ))
            .unwrap();

        let block = ledger.latest_block().unwrap().clone();
        let decoded: Block = serde_json::from_str(&serde_json::to_string(&block).unwrap()).unwrap();

        assert_eq!(decoded.calculate_hash(), block.hash);
        assert_eq!(decoded.transaction_tree().root(), block.merkle_root);
        assert!(decoded.validate(Some(&ledger.chain()[0])).is_ok());
    }

    #[test]
    fn test_snapshot_json_imports_elsewhere() {
        let (mut source, clock) = fixtures::ledger(2);
        for n in 0..5 {
            source.submit(note(&clock, n)).unwrap();
        }
        let json = source.export().to_json().unwrap();

        let (mut target, _) = fixtures::ledger(2);
        target.import(LedgerSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(target.state_root(), source.state_root());
        assert_eq!(target.chain_stats().last_block_hash, source.chain_stats().last_block_hash);
        // Pools are not part of a snapshot.
        assert_eq!(source.pool_len(), 1);
        assert_eq!(target.pool_len(), 0);
    }

    #[test]
    fn test_state_value_layout() {
        let (mut ledger, clock) = fixtures::ledger(1);
        ledger
            .submit(fixtures::unsigned(
                &clock,
                TransactionKind::Economic,
                Some("bob"),
                json!({ "action": "credit", "amount": 7 }),
            ))
            .unwrap();

        let value = ledger.state().get("balance:bob").unwrap();
        let encoded = serde_json::to_value(value).unwrap();
        assert_eq!(encoded["type"], "balance");
        assert_eq!(encoded["value"]["amount"], 7);

        let decoded: StateValue = serde_json::from_value(encoded).unwrap();
        assert_eq!(&decoded, value);
    }

    #[test]
    fn test_event_layout() {
        let event = LedgerEvent::MiningAborted {
            index: 4,
            requeued: 2,
        };
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded["event"], "mining_aborted");
        assert_eq!(encoded["requeued"], 2);
    }

    #[test]
    fn test_float_payload_snapshot_reimports() {
        let (mut source, clock) = fixtures::ledger(1);
        source
            .submit(unsigned_reading(&clock, 5.770641419114629e-148))
            .unwrap();
        let json = source.export().to_json().unwrap();

        let (mut target, _) = fixtures::ledger(1);
        target.import(LedgerSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(target.state_root(), source.state_root());
        assert_eq!(target.chain(), source.chain());
    }

    fn unsigned_reading(clock: &shared_types::ManualTimeSource, reading: f64) -> Transaction {
        fixtures::unsigned(clock, TransactionKind::Generic, None, json!({ "reading": reading }))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_float_payload_hash_survives_json(
            reading in any::<f64>().prop_filter("finite", |v| v.is_finite())
        ) {
            let clock = shared_types::ManualTimeSource::new(fixtures::START);
            let tx = unsigned_reading(&clock, reading);

            let decoded: Transaction =
                serde_json::from_str(&serde_json::to_string(&tx).unwrap()).unwrap();
            prop_assert_eq!(decoded.payload["reading"].as_f64(), Some(reading));
            prop_assert_eq!(decoded.hash(), tx.hash());
        }
    }
}
