//! # Adapters
//!
//! Concrete implementations of the node's outer edges.

pub mod block_feed;

pub use block_feed::{open_feed, run_feed_producer, BlockFeedReader, FeedError, FeedInput};
