//! # Ledger Service
//!
//! Async, shareable front for a [`Ledger`].
//!
//! - Writers (`submit`, block prepare/commit, `import`) take the write lock
//!   for short critical sections.
//! - Readers take the read lock and see a consistent view.
//! - The nonce search runs on the blocking pool with no lock held; a
//!   producer mutex keeps at most one block in flight.

use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::ledger::{ChainStats, Ledger, LedgerStats, TransactionProof};
use crate::ports::LedgerApi;
use crate::snapshot::LedgerSnapshot;
use async_trait::async_trait;
use ml_02_transactions::{Transaction, TransactionKind, TxId};
use ml_05_block_production::Block;
use parking_lot::RwLock;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Address, Hash};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

/// Thread-safe handle to a ledger. Cheap to clone.
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<RwLock<Ledger>>,
    producer: Arc<Mutex<()>>,
}

impl LedgerService {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            producer: Arc::new(Mutex::new(())),
        }
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.ledger.read())
    }

    /// Run `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.ledger.write())
    }

    /// Admit a transaction, producing a block if the batch is full.
    ///
    /// Automatic production failures are reported but do not fail the
    /// submission.
    pub async fn submit(&self, tx: Transaction) -> Result<TxId> {
        let (tx_id, batch_ready, miner) = {
            let mut ledger = self.ledger.write();
            let tx_id = ledger.admit(tx)?;
            (tx_id, ledger.batch_ready(), ledger.config().default_miner.clone())
        };

        if batch_ready {
            match self.produce_block(miner).await {
                // Another producer already drained the pool.
                Ok(_) | Err(LedgerError::NoPendingTransactions) => {}
                Err(e) => self.ledger.read().report_auto_production_failure(&e),
            }
        }

        Ok(tx_id)
    }

    /// Produce one block without holding the ledger lock while mining.
    pub async fn produce_block(&self, miner: Option<String>) -> Result<Block> {
        let _producer = self.producer.lock().await;

        let (mut pending, control) = {
            let mut ledger = self.ledger.write();
            let pending = ledger.prepare_block(miner.as_deref())?;
            (pending, ledger.mining_control())
        };
        debug!("[ml-07] Mining block {} off-lock", pending.index());

        let (pending, mined) = tokio::task::spawn_blocking(move || {
            let mined = pending.mine(&control);
            (pending, mined)
        })
        .await
        .map_err(|e| LedgerError::Internal(format!("mining task failed: {e}")))?;

        let mut ledger = self.ledger.write();
        match mined {
            Ok(outcome) => ledger.commit_block(pending, outcome),
            Err(e) => Err(ledger.abort_block(pending, e)),
        }
    }

    pub fn validate_chain(&self) -> std::result::Result<(), Vec<String>> {
        self.ledger.read().validate_chain()
    }

    pub fn export(&self) -> LedgerSnapshot {
        self.ledger.read().export()
    }

    /// Import a snapshot. Waits for any in-flight block first.
    pub async fn import(&self, snapshot: LedgerSnapshot) -> Result<()> {
        let _producer = self.producer.lock().await;
        self.ledger.write().import(snapshot)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.ledger.read().subscribe()
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.read().stats()
    }

    /// Abort any in-flight search and refuse further mining.
    pub fn shutdown(&self) {
        info!("[ml-07] Ledger service shutting down");
        self.ledger.read().cancel_token().cancel();
    }
}

#[async_trait]
impl LedgerApi for LedgerService {
    async fn submit_transaction(
        &self,
        kind: TransactionKind,
        sender: Option<Address>,
        recipient: Option<Address>,
        payload: serde_json::Value,
        signer: Option<&Ed25519KeyPair>,
    ) -> Result<TxId> {
        let clock = self.ledger.read().time_source();
        let mut tx = Transaction::create_at(clock.as_ref(), kind, sender, recipient, payload);
        if let Some(keypair) = signer {
            tx.sign(keypair);
        }
        self.submit(tx).await
    }

    async fn get_state_root(&self) -> Hash {
        self.ledger.read().state_root()
    }

    async fn get_transaction_proof(&self, tx_id: &TxId) -> Result<TransactionProof> {
        self.ledger
            .read()
            .transaction_proof(tx_id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", shared_types::to_hex(tx_id))))
    }

    async fn get_chain_stats(&self) -> ChainStats {
        self.ledger.read().chain_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use serde_json::json;
    use shared_types::ManualTimeSource;

    fn service(batch_size: usize) -> LedgerService {
        let config = LedgerConfig {
            difficulty: 1,
            batch_size,
            ..LedgerConfig::default()
        };
        let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
        LedgerService::new(Ledger::with_time_source(config, clock).unwrap())
    }

    fn note(n: u64) -> serde_json::Value {
        json!({"note": n})
    }

    #[tokio::test]
    async fn test_api_submit_and_prove() {
        let svc = service(2);
        let genesis_root = svc.get_state_root().await;

        let first = svc
            .submit_transaction(TransactionKind::Generic, None, None, note(1), None)
            .await
            .unwrap();
        assert!(matches!(
            svc.get_transaction_proof(&first).await,
            Err(LedgerError::NotFound(_))
        ));

        svc.submit_transaction(TransactionKind::Generic, None, None, note(2), None)
            .await
            .unwrap();

        let stats = svc.get_chain_stats().await;
        assert_eq!(stats.length, 2);
        assert_eq!(stats.pending_count, 0);
        assert_ne!(svc.get_state_root().await, genesis_root);

        let proof = svc.get_transaction_proof(&first).await.unwrap();
        assert!(svc.read(|l| l.verify_transaction_proof(&first, &proof)));
    }

    #[tokio::test]
    async fn test_signed_submission_through_api() {
        let svc = service(10);
        let keypair = Ed25519KeyPair::from_seed([4; 32]);

        let unsigned = svc
            .submit_transaction(
                TransactionKind::Economic,
                Some("alice".into()),
                None,
                json!({"action": "debit", "amount": 5}),
                None,
            )
            .await;
        assert!(matches!(unsigned, Err(LedgerError::Validation(_))));

        let signed = svc
            .submit_transaction(
                TransactionKind::Economic,
                Some("alice".into()),
                None,
                json!({"action": "debit", "amount": 5}),
                Some(&keypair),
            )
            .await;
        assert!(signed.is_ok());
        assert_eq!(svc.read(|l| l.pool_len()), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submitters_are_serialized() {
        let svc = service(5);
        let mut handles = Vec::new();
        for n in 0..20u64 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.submit_transaction(TransactionKind::Generic, None, None, note(n), None)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Drain whatever auto-production left behind.
        while svc.read(|l| l.pool_len()) > 0 {
            svc.produce_block(None).await.unwrap();
        }

        assert!(svc.validate_chain().is_ok());
        let included: usize = svc.read(|l| {
            l.chain()
                .iter()
                .skip(1)
                .map(|b| b.transactions.len())
                .sum()
        });
        assert_eq!(included, 20);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_mining_and_requeues() {
        let svc = service(100);
        svc.submit_transaction(TransactionKind::Generic, None, None, note(1), None)
            .await
            .unwrap();

        svc.shutdown();
        let result = svc.produce_block(None).await;
        assert!(matches!(result, Err(LedgerError::MiningAborted(_))));
        assert_eq!(svc.read(|l| l.pool_len()), 1);
        assert_eq!(svc.read(|l| l.chain().len()), 1);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let svc = service(1);
        let mut events = svc.subscribe();
        svc.submit_transaction(TransactionKind::Generic, None, None, note(1), None)
            .await
            .unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            LedgerEvent::TransactionAccepted { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            LedgerEvent::BlockAppended { index: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_import_through_service() {
        let source = service(1);
        source
            .submit_transaction(TransactionKind::Generic, None, None, note(7), None)
            .await
            .unwrap();
        let snapshot = source.export();

        let target = service(1);
        target.import(snapshot).await.unwrap();
        assert_eq!(
            target.get_state_root().await,
            source.get_state_root().await
        );
        assert_eq!(target.stats().chain.length, 2);
    }

    #[tokio::test]
    async fn test_discarded_batch_is_reported() {
        let svc = service(1);
        let mut events = svc.subscribe();

        svc.submit_transaction(
            TransactionKind::Economic,
            None,
            Some("whale".into()),
            json!({"action": "credit", "amount": 1u64 << 63}),
            None,
        )
        .await
        .unwrap();

        assert_eq!(svc.stats().chain.length, 1);
        let mut reported = false;
        while let Ok(event) = events.try_recv() {
            if let LedgerEvent::AutoProductionFailed { error } = event {
                reported = error.contains("Batch discarded");
            }
        }
        assert!(reported);
    }
}
