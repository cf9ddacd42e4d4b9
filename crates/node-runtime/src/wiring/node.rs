//! # Stake Node
//!
//! Wires the three long-running tasks together:
//!
//! ```text
//! [feed producer] ──mpsc<FeedBlock>──→ [ledger consumer] ──watch<Arc<LedgerState>>──→ [query gateway]
//!                                             │
//!                                             ↓
//!                                   history/<height>.payout.json
//! ```
//!
//! A fatal error in any task flips the shared shutdown flag; every other task
//! observes it and stops. The end of the feed is not fatal: the gateway keeps
//! serving the last published state until shutdown.

use crate::adapters::{open_feed, run_feed_producer};
use crate::container::NodeConfig;
use crate::wiring::LedgerConsumer;
use anyhow::{anyhow, Context, Result};
use sl_02_stake_ledger::{FileSnapshotStore, LedgerEngine};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

pub struct StakeNode {
    config: NodeConfig,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl StakeNode {
    pub fn new(config: NodeConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Handle for triggering shutdown from outside `run`.
    pub fn shutdown_handle(&self) -> Arc<watch::Sender<bool>> {
        Arc::clone(&self.shutdown_tx)
    }

    /// Run until shutdown is signalled or a task fails.
    pub async fn run(self) -> Result<()> {
        self.config
            .validate()
            .context("Invalid node configuration")?;

        info!("===========================================");
        info!("  Stake Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            stake_size = %self.config.ledger.stake_size,
            stake_start = self.config.ledger.stake_start,
            payout_interval = self.config.ledger.payout_interval,
            "Ledger parameters"
        );

        let store = FileSnapshotStore::open(&self.config.storage.history_dir)
            .context("Failed to open payout history")?;
        info!(
            history_dir = %store.dir().display(),
            first_payout = self
                .config
                .ledger
                .next_payout_boundary(self.config.ledger.stake_start),
            "Payout history ready"
        );
        let engine = LedgerEngine::new(self.config.ledger.clone(), store)
            .context("Failed to create ledger engine")?;

        let (state_tx, state_rx) = watch::channel(Arc::new(engine.state()));
        let (block_tx, block_rx) = mpsc::channel(self.config.feed.buffer);

        let reader = open_feed(&self.config.feed.source)
            .await
            .context("Failed to open block feed")?;

        let producer = {
            let shutdown_rx = self.shutdown_rx.clone();
            let trip = Arc::clone(&self.shutdown_tx);
            tokio::spawn(async move {
                let result = run_feed_producer(reader, block_tx, shutdown_rx).await;
                if let Err(e) = &result {
                    error!(error = %e, "[feed] Block feed failed");
                    trip.send_replace(true);
                }
                result
            })
        };

        let consumer = {
            let shutdown_rx = self.shutdown_rx.clone();
            let trip = Arc::clone(&self.shutdown_tx);
            let consumer = LedgerConsumer::new(engine, state_tx);
            tokio::spawn(async move {
                let result = consumer.run(block_rx, shutdown_rx).await;
                if result.is_err() {
                    trip.send_replace(true);
                }
                result
            })
        };

        let gateway = {
            let shutdown_rx = self.shutdown_rx.clone();
            let trip = Arc::clone(&self.shutdown_tx);
            let gateway_config = self.config.gateway.clone();
            tokio::spawn(async move {
                let result = sl_04_query_gateway::serve(gateway_config, state_rx, shutdown_rx).await;
                if let Err(e) = &result {
                    error!(error = %e, "[sl-04] Query gateway failed");
                    trip.send_replace(true);
                }
                result
            })
        };

        let signal = {
            let trip = Arc::clone(&self.shutdown_tx);
            let mut shutdown_rx = self.shutdown_rx.clone();
            tokio::spawn(async move {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            error!(error = %e, "Failed to listen for Ctrl+C");
                        }
                        info!("Initiating graceful shutdown...");
                        trip.send_replace(true);
                    }
                    _ = shutdown_rx.changed() => {}
                }
            })
        };

        info!("Node is running. Press Ctrl+C to stop.");
        let (producer, consumer, gateway) = tokio::join!(producer, consumer, gateway);
        signal.abort();

        let mut failure = None;
        match producer.context("Feed task panicked")? {
            Ok(forwarded) => info!(forwarded, "[feed] Producer stopped"),
            Err(e) => failure = failure.or(Some(anyhow!(e).context("Block feed failed"))),
        }
        match consumer.context("Ledger task panicked")? {
            Ok(last_height) => info!(last_height = ?last_height, "[sl-02] Consumer stopped"),
            Err(e) => failure = failure.or(Some(anyhow!(e).context("Ledger halted"))),
        }
        if let Err(e) = gateway.context("Gateway task panicked")? {
            failure = failure.or(Some(anyhow!(e).context("Query gateway failed")));
        }

        info!("Shutdown complete");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
