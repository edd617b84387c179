//! # Submission → Block → State
//!
//! Drives transactions of every kind through fraud screening, the pool,
//! block production and the state manager, then checks the committed
//! state and the chain against each other.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{self, note, signed, unsigned};
    use ml_02_transactions::TransactionKind;
    use ml_04_state_management::{StateConfig, StateManager};
    use ml_07_ledger::{LedgerApi, LedgerError, LedgerEvent, LedgerService};
    use serde_json::json;
    use shared_types::to_hex;

    #[test]
    fn test_mixed_kinds_commit_typed_state() {
        let (mut ledger, clock) = fixtures::ledger(100);

        let identity = unsigned(
            &clock,
            TransactionKind::Identity,
            None,
            json!({ "did": "did:ml:alice", "action": "create", "publicKey": "ab12" }),
        );
        let credit = unsigned(
            &clock,
            TransactionKind::Economic,
            Some("bob"),
            json!({ "action": "credit", "amount": 250 }),
        );
        let vote_yes = signed(
            &clock,
            TransactionKind::Governance,
            "alice",
            json!({ "proposalId": "p-1", "vote": "yes" }),
        );
        let vote_no = signed(
            &clock,
            TransactionKind::Governance,
            "carol",
            json!({ "proposalId": "p-1", "vote": "no" }),
        );
        let vote_again = signed(
            &clock,
            TransactionKind::Governance,
            "alice",
            json!({ "proposalId": "p-1", "vote": "no" }),
        );
        let audit = unsigned(
            &clock,
            TransactionKind::Audit,
            None,
            json!({ "entityId": "acct-9", "eventType": "login", "details": { "ip": "10.0.0.1" } }),
        );
        let audit_id = audit.id;

        for tx in [identity, credit, vote_yes, vote_no, vote_again, audit] {
            ledger.submit(tx).unwrap();
        }
        ledger.produce_block(Some("miner-1")).unwrap();

        let state = ledger.state();

        let record = state.get("identity:did:ml:alice").and_then(|v| v.as_identity()).unwrap();
        assert_eq!(record.public_key.as_deref(), Some("ab12"));
        assert_eq!(record.created, Some(fixtures::START));
        assert!(!record.revoked);

        assert_eq!(state.balance("bob"), 250);
        assert_eq!(state.balance("miner-1"), 50);

        let tally = state.get("vote:p-1").and_then(|v| v.as_votes()).unwrap();
        assert_eq!((tally.yes, tally.no, tally.abstain), (1, 1, 0));
        assert_eq!(tally.voters.len(), 2);

        let log = state.get("audit:acct-9").and_then(|v| v.as_audit()).unwrap();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].event_id, audit_id);
        assert_eq!(log.events[0].details["ip"], "10.0.0.1");

        assert!(ledger.validate_chain().is_ok());
    }

    #[test]
    fn test_state_replay_is_deterministic() {
        let (mut ledger, clock) = fixtures::ledger(3);
        for n in 0..7 {
            ledger.submit(note(&clock, n)).unwrap();
            clock.advance_millis(10);
        }
        ledger
            .submit(signed(
                &clock,
                TransactionKind::Economic,
                "dave",
                json!({ "action": "debit", "amount": 40 }),
            ))
            .unwrap();
        ledger.produce_block(Some("miner-2")).unwrap();

        let mut replayed = StateManager::new(StateConfig::default());
        for block in ledger.chain() {
            for tx in &block.transactions {
                replayed.apply(tx).unwrap();
            }
            assert_eq!(
                block.state_root,
                Some(replayed.state_root()),
                "block {} state root",
                block.index
            );
        }
        assert_eq!(replayed.entries(), ledger.state().entries());
        assert_eq!(replayed.balance("dave"), -40);
    }

    #[test]
    fn test_batches_mine_automatically() {
        let (mut ledger, clock) = fixtures::ledger(5);
        for n in 0..23 {
            ledger.submit(note(&clock, n)).unwrap();
        }

        assert_eq!(ledger.chain().len(), 5);
        assert_eq!(ledger.pool_len(), 3);
        assert!(ledger
            .chain()
            .iter()
            .skip(1)
            .all(|block| block.transactions.len() == 5));
        assert_eq!(ledger.metrics().total_blocks, 5);
        assert_eq!(ledger.metrics().total_transactions, 21);
        assert!(ledger.validate_chain().is_ok());
    }

    #[test]
    fn test_unappliable_transaction_is_dropped_from_block() {
        let (mut ledger, clock) = fixtures::ledger(100);
        let mut rx = ledger.subscribe();

        let kept = ledger.submit(note(&clock, 1)).unwrap();
        let overflow = ledger
            .submit(unsigned(
                &clock,
                TransactionKind::Economic,
                Some("whale"),
                json!({ "action": "credit", "amount": 1u64 << 63 }),
            ))
            .unwrap();

        let block = ledger.produce_block(None).unwrap();
        let ids: Vec<_> = block.transactions.iter().map(|tx| tx.id).collect();
        assert_eq!(ids, vec![kept]);
        assert_eq!(ledger.state().balance("whale"), 0);
        assert!(ledger.transaction_status(&overflow).is_none());

        let mut dropped = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, LedgerEvent::TransactionRejected { tx_id, .. } if tx_id == overflow) {
                dropped = true;
            }
        }
        assert!(dropped);
    }

    #[test]
    fn test_signature_gate_message() {
        let (mut ledger, clock) = fixtures::ledger(10);
        let tx = ml_02_transactions::Transaction::create_at(
            &clock,
            TransactionKind::Economic,
            Some("erin".into()),
            None,
            json!({ "action": "debit", "amount": 1 }),
        );

        let err = ledger.submit(tx).unwrap_err();
        assert!(err
            .to_string()
            .contains("Signed transactions must have a signature"));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_velocity_limit_through_service() {
        let (ledger, clock) = fixtures::ledger(100);
        let service = LedgerService::new(ledger);
        let debit = || {
            signed(
                &clock,
                TransactionKind::Economic,
                "alice",
                json!({ "action": "debit", "amount": 3 }),
            )
        };

        for _ in 0..10 {
            service.submit(debit()).await.unwrap();
        }
        let eleventh = service.submit(debit()).await;
        assert!(matches!(eleventh, Err(LedgerError::FraudRejected { .. })));

        // Other senders have their own window.
        let other = signed(
            &clock,
            TransactionKind::Economic,
            "bob",
            json!({ "action": "debit", "amount": 3 }),
        );
        assert!(service.submit(other).await.is_ok());

        let stats = service.get_chain_stats().await;
        assert_eq!(stats.pending_count, 11);
        assert_eq!(service.stats().metrics.rejected_transactions, 1);
    }

    #[tokio::test]
    async fn test_proof_from_service_checks_against_block() {
        let (ledger, clock) = fixtures::ledger(2);
        let service = LedgerService::new(ledger);

        let a = service.submit(note(&clock, 1)).await.unwrap();
        service.submit(note(&clock, 2)).await.unwrap();

        let proof = service.get_transaction_proof(&a).await.unwrap();
        let tx_hash = service.read(|l| l.transaction(&a).unwrap().transaction.hash());
        assert!(proof.merkle_proof.verify(&proof.merkle_root));
        assert_eq!(proof.merkle_proof.leaf_hash, tx_hash);

        let missing = service.get_transaction_proof(&[0x11; 32]).await.unwrap_err();
        assert!(missing.to_string().contains(&to_hex(&[0x11; 32])));
    }
}
