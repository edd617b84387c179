//! # Merkle-Ledger Node
//!
//! Startup sequence:
//!
//! 1. Load configuration from `ML_*` environment variables
//! 2. Initialize logging (`RUST_LOG` wins over `ML_LOG`)
//! 3. Create the ledger (mines genesis) and restore the snapshot, if any
//! 4. Start event logging and status reporting
//! 5. Wait for Ctrl+C, cancel mining, write the snapshot

use anyhow::Result;
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env()?;
    init_logging(&config.log_filter);

    let mut runtime = NodeRuntime::new(config).await?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await
}
