//! # Proof Flows
//!
//! Transaction inclusion proofs issued by the ledger and state proofs issued
//! by the state manager, checked with the Merkle verifier alone.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{self, note, unsigned};
    use ml_01_merkle_tree::{MerkleTree, SiblingPosition};
    use ml_02_transactions::TransactionKind;
    use ml_04_state_management::StateManager;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_every_transaction_proves_against_its_block() {
        let (mut ledger, clock) = fixtures::ledger(4);
        let ids: Vec<_> = (0..11)
            .map(|n| ledger.submit(note(&clock, n)).unwrap())
            .collect();
        ledger.produce_block(Some("miner-1")).unwrap();

        for id in &ids {
            let proof = ledger.transaction_proof(id).unwrap();
            let block = ledger.block_by_hash(&proof.block_hash).unwrap();
            let tx = &block.transactions[proof.tx_index];

            assert_eq!(tx.id, *id);
            assert!(MerkleTree::verify(
                &tx.hash(),
                &proof.merkle_proof.path,
                &block.merkle_root
            ));
            assert!(ledger.verify_transaction_proof(id, &proof));
        }
    }

    #[test]
    fn test_tampered_proofs_fail() {
        let (mut ledger, clock) = fixtures::ledger(3);
        let ids: Vec<_> = (0..6)
            .map(|n| ledger.submit(note(&clock, n)).unwrap())
            .collect();

        let proof = ledger.transaction_proof(&ids[0]).unwrap();

        let mut flipped = proof.clone();
        flipped.merkle_proof.path[0].position = match flipped.merkle_proof.path[0].position {
            SiblingPosition::Left => SiblingPosition::Right,
            SiblingPosition::Right => SiblingPosition::Left,
        };
        assert!(!flipped.merkle_proof.verify(&flipped.merkle_root));

        let mut wrong_sibling = proof.clone();
        wrong_sibling.merkle_proof.path[0].hash[0] ^= 0xFF;
        assert!(!wrong_sibling.merkle_proof.verify(&wrong_sibling.merkle_root));
        assert!(!ledger.verify_transaction_proof(&ids[0], &wrong_sibling));

        // A proof from block 1 does not hold against block 2's root.
        let other_root = ledger.chain()[2].merkle_root;
        assert!(!proof.merkle_proof.verify(&other_root));
    }

    #[test]
    fn test_state_proofs_track_the_root() {
        let (mut ledger, clock) = fixtures::ledger(1);
        ledger
            .submit(unsigned(
                &clock,
                TransactionKind::Economic,
                Some("bob"),
                json!({ "action": "credit", "amount": 10 }),
            ))
            .unwrap();

        let root = ledger.state_root();
        let value = ledger.state().get("balance:bob").cloned().unwrap();
        let proof = ledger.state_proof("balance:bob").unwrap();
        assert!(StateManager::verify("balance:bob", &value, &proof, &root));
        assert!(!StateManager::verify("balance:carol", &value, &proof, &root));

        ledger
            .submit(unsigned(
                &clock,
                TransactionKind::Economic,
                Some("bob"),
                json!({ "action": "credit", "amount": 5 }),
            ))
            .unwrap();

        // The old value no longer proves against the new root.
        let new_root = ledger.state_root();
        assert_ne!(root, new_root);
        assert!(!StateManager::verify("balance:bob", &value, &proof, &new_root));

        let fresh = ledger.state_proof("balance:bob").unwrap();
        let current = ledger.state().get("balance:bob").unwrap();
        assert!(StateManager::verify("balance:bob", current, &fresh, &new_root));
        assert!(ledger.state_proof("balance:nobody").is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_block_proofs_verify(count in 1usize..16) {
            let (mut ledger, clock) = fixtures::ledger(64);
            let ids: Vec<_> = (0..count as u64)
                .map(|n| ledger.submit(note(&clock, n)).unwrap())
                .collect();
            ledger.produce_block(None).unwrap();

            for id in &ids {
                let proof = ledger.transaction_proof(id).unwrap();
                prop_assert!(ledger.verify_transaction_proof(id, &proof));
                prop_assert!(proof.merkle_proof.verify(&proof.merkle_root));
            }
        }
    }
}
