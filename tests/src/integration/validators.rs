//! # Validator Flows
//!
//! The consensus engine judging blocks produced by the ledger, and
//! stake-weighted selection over a registered validator set.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{self, note};
    use ml_06_consensus::{ConsensusEngine, REPUTATION_PENALTY, REPUTATION_REWARD};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_types::ManualTimeSource;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_ledger_blocks_pass_proposal_validation() {
        let (mut ledger, clock) = fixtures::ledger(2);
        ledger.register_validator("val-a", 100);
        ledger.submit(note(&clock, 1)).unwrap();
        ledger.submit(note(&clock, 2)).unwrap();

        let block = ledger.latest_block().unwrap().clone();
        assert!(ledger.consensus_mut().validate_proposal(&block, "val-a"));

        let record = ledger.consensus().validator("val-a").unwrap();
        assert_eq!(record.accepted_proposals, 1);
        assert_eq!(record.reputation, 1.0);
        assert_eq!(record.last_validation, Some(fixtures::START));

        let mut forged = block;
        forged.transactions.pop();
        assert!(!ledger.consensus_mut().validate_proposal(&forged, "val-a"));
        let record = ledger.consensus().validator("val-a").unwrap();
        assert_eq!(record.rejected_proposals, 1);
        assert!((record.reputation - (1.0 - REPUTATION_PENALTY)).abs() < 1e-9);

        let genesis = ledger.chain()[0].clone();
        assert!(!ledger.consensus_mut().validate_proposal(&genesis, "ghost"));
    }

    #[test]
    fn test_reputation_is_clamped() {
        let (mut ledger, clock) = fixtures::ledger(1);
        ledger.register_validator("val-b", 10);
        ledger.submit(note(&clock, 1)).unwrap();

        let mut bad = ledger.latest_block().unwrap().clone();
        bad.nonce = bad.nonce.wrapping_add(1);

        for _ in 0..15 {
            ledger.consensus_mut().validate_proposal(&bad, "val-b");
        }
        assert_eq!(ledger.consensus().validator("val-b").unwrap().reputation, 0.0);

        let good = ledger.latest_block().unwrap().clone();
        for _ in 0..200 {
            ledger.consensus_mut().validate_proposal(&good, "val-b");
        }
        let record = ledger.consensus().validator("val-b").unwrap();
        assert_eq!(record.reputation, 1.0);
        assert_eq!(record.accepted_proposals, 200);
        assert!(REPUTATION_REWARD > 0.0);
    }

    #[test]
    fn test_selection_is_stake_weighted() {
        let mut engine = ConsensusEngine::new(Arc::new(ManualTimeSource::new(fixtures::START)));
        engine.register("small", 100);
        engine.register("medium", 300);
        engine.register("large", 600);
        engine.register("idle", 0);

        let mut rng = StdRng::seed_from_u64(7);
        let draws = 10_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..draws {
            let chosen = engine.select_validator_with(&mut rng).unwrap();
            *counts.entry(chosen).or_default() += 1;
        }

        let share = |name: &str| *counts.get(name).unwrap_or(&0) as f64 / draws as f64;
        assert!((share("small") - 0.1).abs() < 0.03);
        assert!((share("medium") - 0.3).abs() < 0.03);
        assert!((share("large") - 0.6).abs() < 0.03);
        assert_eq!(share("idle"), 0.0);
    }

    #[test]
    fn test_selection_is_reproducible_with_seed() {
        let (mut ledger, _) = fixtures::ledger(1);
        ledger.register_validator("a", 5);
        ledger.register_validator("b", 5);
        ledger.register_validator("c", 5);

        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| ledger.consensus().select_validator_with(&mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
        assert_eq!(ledger.stats().total_stake, 15);
        assert_eq!(ledger.stats().validators, 3);
    }

    #[test]
    fn test_empty_set_selects_nobody() {
        let (ledger, _) = fixtures::ledger(1);
        assert!(ledger.consensus().select_validator().is_none());
    }
}
