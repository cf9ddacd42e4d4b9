//! # Block Diff Extraction
//!
//! In the same block, the same UTXO can appear in the outputs of one
//! transaction and the inputs of another. Extraction reports both; the ledger
//! resolves them by applying creations before consumptions.

use super::{BlockDiff, UtxoConsumption, UtxoCreation};
use shared_types::{FeedBlock, Height, RawBlock, UtxoRef};

/// Compute the UTXO diff of one block at `height`.
pub fn extract_diff(height: Height, block: &RawBlock) -> BlockDiff {
    let mut creations = Vec::new();
    let mut consumptions = Vec::new();

    for tx in &block.txs {
        for output in tx.vouts.iter().filter(|o| !o.is_unspendable()) {
            creations.push(UtxoCreation {
                utxo: UtxoRef::new(output.txid.clone(), output.vout),
                address: output.address.clone().unwrap_or_default(),
                height,
                value: output.value.clone(),
            });
        }

        for input in tx.vins.iter().filter(|i| !i.is_coinbase()) {
            consumptions.push(UtxoConsumption {
                utxo: UtxoRef::new(
                    input.txid.clone().unwrap_or_default(),
                    input.vout.unwrap_or_default(),
                ),
                address: input.address.clone().unwrap_or_default(),
            });
        }
    }

    BlockDiff {
        height,
        creations,
        consumptions,
    }
}

/// Convenience wrapper for feed items.
pub fn extract_feed_block(feed: &FeedBlock) -> BlockDiff {
    extract_diff(feed.height, &feed.block)
}
