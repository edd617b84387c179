//! Ledger metrics

use serde::{Deserialize, Serialize};

/// Counters and gauges maintained by the ledger.
///
/// Plain fields: the ledger is single-writer, and the values travel inside
/// snapshots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerMetrics {
    /// Transactions included in appended blocks (genesis and rewards too)
    pub total_transactions: u64,

    /// Appended blocks, genesis included
    pub total_blocks: u64,

    /// Mean interval between consecutive block timestamps
    pub average_block_time_ms: f64,

    /// Hash rate of the most recent successful search (hashes/s)
    pub network_hash_rate: f64,

    /// Entries in committed state
    pub state_size: usize,

    /// Submissions refused by validation or fraud checks
    pub rejected_transactions: u64,

    /// Sealed blocks that failed validation
    pub rejected_blocks: u64,

    /// Nonce searches that were cancelled or ran out of attempts
    pub aborted_mining: u64,
}

impl LedgerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an appended block.
    ///
    /// `block_time_ms` is `None` for genesis.
    pub fn record_block(
        &mut self,
        tx_count: usize,
        block_time_ms: Option<u64>,
        hash_rate: f64,
        state_size: usize,
    ) {
        if let Some(ms) = block_time_ms {
            let intervals = self.total_blocks.saturating_sub(1) as f64;
            self.average_block_time_ms =
                (self.average_block_time_ms * intervals + ms as f64) / (intervals + 1.0);
        }
        self.total_blocks += 1;
        self.total_transactions += tx_count as u64;
        self.network_hash_rate = hash_rate;
        self.state_size = state_size;
    }

    pub fn record_rejected_transaction(&mut self) {
        self.rejected_transactions += 1;
    }

    pub fn record_rejected_block(&mut self) {
        self.rejected_blocks += 1;
    }

    pub fn record_aborted_mining(&mut self) {
        self.aborted_mining += 1;
    }

    /// Average transactions per block
    pub fn avg_transactions_per_block(&self) -> f64 {
        if self.total_blocks == 0 {
            return 0.0;
        }
        self.total_transactions as f64 / self.total_blocks as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_block_time() {
        let mut metrics = LedgerMetrics::new();
        metrics.record_block(1, None, 0.0, 1);
        assert_eq!(metrics.average_block_time_ms, 0.0);

        metrics.record_block(3, Some(100), 10.0, 2);
        metrics.record_block(2, Some(300), 20.0, 3);
        assert_eq!(metrics.total_blocks, 3);
        assert_eq!(metrics.total_transactions, 6);
        assert!((metrics.average_block_time_ms - 200.0).abs() < 1e-9);
        assert_eq!(metrics.network_hash_rate, 20.0);
        assert_eq!(metrics.state_size, 3);
        assert!((metrics.avg_transactions_per_block() - 2.0).abs() < 1e-9);
    }
}
