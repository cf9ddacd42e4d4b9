//! # Block Feed Adapter
//!
//! Reads the ordered block feed as JSON lines, one `FeedBlock` per line, and
//! forwards blocks to the ledger over a bounded channel. Blank lines are
//! skipped. A line that does not decode stops the feed: skipping it would
//! drop a height.

use crate::container::FeedSource;
use shared_types::FeedBlock;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("undecodable feed line {line}: {message}")]
    Decode { line: u64, message: String },
}

/// Boxed reader so stdin and files share one type.
pub type FeedInput = Box<dyn AsyncBufRead + Unpin + Send>;

/// Line-oriented feed decoder.
pub struct BlockFeedReader<R> {
    lines: Lines<R>,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin> BlockFeedReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Next block, or `None` at end of input.
    pub async fn next_block(&mut self) -> Result<Option<FeedBlock>, FeedError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let block = serde_json::from_str(line).map_err(|e| FeedError::Decode {
                line: self.line_no,
                message: e.to_string(),
            })?;
            return Ok(Some(block));
        }
        Ok(None)
    }
}

/// Open the configured feed source.
pub async fn open_feed(source: &FeedSource) -> Result<BlockFeedReader<FeedInput>, FeedError> {
    let input: FeedInput = match source {
        FeedSource::Stdin => {
            info!("[feed] Reading blocks from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
        FeedSource::File(path) => {
            info!("[feed] Reading blocks from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
    };
    Ok(BlockFeedReader::new(input))
}

/// Forward every block to `blocks` until end of input, shutdown, or the
/// consumer going away. Returns the number of blocks forwarded.
pub async fn run_feed_producer<R>(
    mut reader: BlockFeedReader<R>,
    blocks: mpsc::Sender<FeedBlock>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut forwarded = 0u64;
    loop {
        let next = tokio::select! {
            next = reader.next_block() => next?,
            _ = shutdown.changed() => {
                info!("[feed] Shutdown signal received");
                return Ok(forwarded);
            }
        };

        let Some(block) = next else {
            info!(forwarded, "[feed] End of block feed");
            return Ok(forwarded);
        };

        debug!(height = block.height, "[feed] Forwarding block");
        if blocks.send(block).await.is_err() {
            debug!("[feed] Ledger consumer gone, stopping");
            return Ok(forwarded);
        }
        forwarded += 1;
    }
}
