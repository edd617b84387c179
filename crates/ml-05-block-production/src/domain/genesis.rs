//! Genesis and reward transactions.

use ml_02_transactions::{Transaction, TransactionKind};
use serde_json::json;
use shared_types::{Hash, TimeSource, ZERO_HASH};

/// `previous_hash` of the genesis block.
pub const GENESIS_PARENT_HASH: Hash = ZERO_HASH;

/// The transaction carried by the genesis block.
pub fn genesis_transaction(clock: &dyn TimeSource, network_id: &str) -> Transaction {
    Transaction::create_at(
        clock,
        TransactionKind::Generic,
        None,
        None,
        json!({
            "message": "Genesis block",
            "network": network_id,
        }),
    )
}

/// Unsigned credit of `amount` to `miner`.
///
/// Senderless, so its state key is the miner's balance.
pub fn reward_transaction(clock: &dyn TimeSource, miner: &str, amount: u64) -> Transaction {
    Transaction::create_at(
        clock,
        TransactionKind::Economic,
        None,
        Some(miner.to_string()),
        json!({
            "action": "credit",
            "amount": amount,
            "reason": "block_reward",
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualTimeSource;

    #[test]
    fn test_genesis_transaction_is_valid() {
        let clock = ManualTimeSource::new(42);
        let tx = genesis_transaction(&clock, "testnet");
        assert!(tx.validate().is_ok());
        assert_eq!(tx.timestamp, 42);
        assert_eq!(tx.payload["network"], "testnet");
    }

    #[test]
    fn test_reward_is_valid_without_signature() {
        let clock = ManualTimeSource::new(42);
        let tx = reward_transaction(&clock, "miner-1", 50);
        assert!(tx.validate().is_ok());
        assert_eq!(tx.recipient.as_deref(), Some("miner-1"));
        assert_eq!(tx.amount(), Some(50.0));
    }
}
