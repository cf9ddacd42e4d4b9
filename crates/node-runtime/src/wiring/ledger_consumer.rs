//! # Ledger Consumer
//!
//! The single writer. Owns the `LedgerEngine`, applies feed blocks strictly in
//! arrival order and publishes an immutable `LedgerState` after each one.
//!
//! Any error from the engine halts the consumer. It is never retried here: a
//! failed snapshot write or an out-of-order block needs an operator.

use shared_types::{FeedBlock, Height};
use sl_01_diff_extraction::extract_feed_block;
use sl_02_stake_ledger::{BlockOutcome, LedgerEngine, LedgerError, LedgerState, SnapshotStore};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

pub struct LedgerConsumer<S: SnapshotStore> {
    engine: LedgerEngine<S>,
    publisher: watch::Sender<Arc<LedgerState>>,
}

impl<S: SnapshotStore> LedgerConsumer<S> {
    pub fn new(engine: LedgerEngine<S>, publisher: watch::Sender<Arc<LedgerState>>) -> Self {
        Self { engine, publisher }
    }

    pub fn engine(&self) -> &LedgerEngine<S> {
        &self.engine
    }

    /// Extract, apply and publish one block.
    pub fn handle(&mut self, block: &FeedBlock) -> Result<BlockOutcome, LedgerError> {
        let diff = extract_feed_block(block);
        let outcome = self.engine.apply_diff(&diff)?;
        self.publisher.send_replace(Arc::new(self.engine.state()));
        Ok(outcome)
    }

    /// Consume blocks until the feed ends or shutdown is signalled. Returns
    /// the last applied height.
    pub async fn run(
        mut self,
        mut blocks: mpsc::Receiver<FeedBlock>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Option<Height>, LedgerError> {
        info!(
            next_height = self.engine.next_height(),
            "[sl-02] Ledger consumer started"
        );

        loop {
            let block = tokio::select! {
                block = blocks.recv() => block,
                _ = shutdown.changed() => {
                    info!("[sl-02] Shutdown signal received");
                    break;
                }
            };

            let Some(block) = block else {
                info!(
                    last_height = ?self.engine.last_height(),
                    "[sl-02] Block feed closed"
                );
                break;
            };

            if let Err(e) = self.handle(&block) {
                error!(
                    height = block.height,
                    error = %e,
                    "[sl-02] ❌ Fatal ledger error, halting block processing"
                );
                return Err(e);
            }
        }

        Ok(self.engine.last_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{RawBlock, RawOutput, RawTransaction};
    use sl_02_stake_ledger::{InMemorySnapshotStore, LedgerConfig};

    fn deposit(height: Height, address: &str, value: &str) -> FeedBlock {
        FeedBlock {
            height,
            block: RawBlock {
                txs: vec![RawTransaction {
                    vouts: vec![RawOutput {
                        txid: format!("tx{}", height),
                        vout: 0,
                        kind: "pubkeyhash".to_string(),
                        address: Some(address.to_string()),
                        value: value.to_string(),
                    }],
                    vins: vec![],
                }],
            },
        }
    }

    fn consumer() -> (
        LedgerConsumer<InMemorySnapshotStore>,
        watch::Receiver<Arc<LedgerState>>,
    ) {
        let engine =
            LedgerEngine::new(LedgerConfig::default(), InMemorySnapshotStore::new()).unwrap();
        let (tx, rx) = watch::channel(Arc::new(engine.state()));
        (LedgerConsumer::new(engine, tx), rx)
    }

    #[test]
    fn test_handle_publishes_state() {
        let (mut consumer, rx) = consumer();
        consumer.handle(&deposit(370_000, "DX", "100000")).unwrap();

        let state = rx.borrow().clone();
        assert_eq!(state.height, Some(370_000));
        assert!(state.all_time.contains_key("DX"));
    }

    #[test]
    fn test_failed_block_publishes_nothing() {
        let (mut consumer, rx) = consumer();
        consumer.handle(&deposit(370_000, "DX", "100000")).unwrap();

        assert!(consumer.handle(&deposit(370_005, "DY", "100000")).is_err());
        assert_eq!(rx.borrow().height, Some(370_000));
        assert!(!rx.borrow().all_time.contains_key("DY"));
    }

    #[tokio::test]
    async fn test_run_until_feed_closes() {
        let (consumer, rx) = consumer();
        let (block_tx, block_rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        block_tx.send(deposit(370_000, "DX", "100000")).await.unwrap();
        block_tx.send(deposit(370_001, "DY", "200000")).await.unwrap();
        drop(block_tx);

        let last = consumer.run(block_rx, shutdown_rx).await.unwrap();
        assert_eq!(last, Some(370_001));
        assert_eq!(rx.borrow().all_time.len(), 2);
    }

    #[tokio::test]
    async fn test_run_halts_on_gap() {
        let (consumer, _rx) = consumer();
        let (block_tx, block_rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        block_tx.send(deposit(370_000, "DX", "100000")).await.unwrap();
        block_tx.send(deposit(370_002, "DY", "100000")).await.unwrap();
        drop(block_tx);

        let err = consumer.run(block_rx, shutdown_rx).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NonSequentialBlock {
                expected: 370_001,
                actual: 370_002
            }
        ));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (consumer, _rx) = consumer();
        let (_block_tx, block_rx) = mpsc::channel::<FeedBlock>(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(consumer.run(block_rx, shutdown_rx));
        shutdown_tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap().unwrap(), None);
    }
}
