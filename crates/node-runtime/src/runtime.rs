//! Node lifecycle: restore, run, persist.

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use ml_07_ledger::{Ledger, LedgerEvent, LedgerService, LedgerSnapshot};
use shared_types::short_hex;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A running ledger node.
pub struct NodeRuntime {
    config: NodeConfig,
    service: LedgerService,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Build the ledger and restore the configured snapshot, if present.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        let ledger = Ledger::new(config.ledger.clone()).context("failed to create ledger")?;
        let service = LedgerService::new(ledger);

        if let Some(path) = &config.snapshot_path {
            if path.exists() {
                let snapshot = read_snapshot(path)?;
                service
                    .import(snapshot)
                    .await
                    .with_context(|| format!("failed to import snapshot {}", path.display()))?;
                info!("Restored ledger from {}", path.display());
            } else {
                info!("No snapshot at {}, starting from genesis", path.display());
            }
        }

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            service,
            shutdown_tx,
            tasks: Vec::new(),
        })
    }

    /// Start background tasks: event logging and periodic status.
    pub fn start(&mut self) {
        let stats = self.service.stats();
        info!("===========================================");
        info!("  Merkle-Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("  Network: {}", self.config.ledger.network_id);
        info!("===========================================");
        info!(
            "Chain height {} head {} difficulty {} batch {}",
            stats.chain.length,
            short_hex(&stats.chain.last_block_hash),
            stats.chain.difficulty,
            self.config.ledger.batch_size
        );

        self.tasks.push(tokio::spawn(log_events(
            self.service.subscribe(),
            self.shutdown_tx.subscribe(),
        )));

        if self.config.status_interval_secs > 0 {
            self.tasks.push(tokio::spawn(report_status(
                self.service.clone(),
                Duration::from_secs(self.config.status_interval_secs),
                self.shutdown_tx.subscribe(),
            )));
        }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    /// Stop mining, stop background tasks and persist the snapshot.
    pub async fn shutdown(self) -> Result<()> {
        info!("Initiating graceful shutdown...");
        self.service.shutdown();

        if let Err(e) = self.shutdown_tx.send(true) {
            debug!("No background tasks to signal: {}", e);
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Background task failed: {}", e);
            }
        }

        if let Some(path) = &self.config.snapshot_path {
            write_snapshot(path, &self.service.export())?;
            info!("Snapshot written to {}", path.display());
        }

        info!("Shutdown complete");
        Ok(())
    }
}

/// Read and version-check a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    LedgerSnapshot::from_json(&raw)
        .with_context(|| format!("failed to decode snapshot {}", path.display()))
}

/// Write a snapshot through a temporary file so a crash never leaves a
/// truncated snapshot behind.
pub fn write_snapshot(path: &Path, snapshot: &LedgerSnapshot) -> Result<()> {
    let json = snapshot.to_json()?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move snapshot into {}", path.display()))?;
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<LedgerEvent>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => debug!(target: "ledger_events", "{}", line),
                    Err(e) => warn!("Unencodable ledger event: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event logger lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = shutdown.changed() => break,
        }
    }
}

async fn report_status(service: LedgerService, every: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stats = service.stats();
                info!(
                    "Status: height={} pending={} blocks={} txs={} rejected={} hash_rate={:.0}/s",
                    stats.chain.length,
                    stats.chain.pending_count,
                    stats.metrics.total_blocks,
                    stats.metrics.total_transactions,
                    stats.metrics.rejected_transactions,
                    stats.metrics.network_hash_rate
                );
            }
            _ = shutdown.changed() => break,
        }
    }
}
