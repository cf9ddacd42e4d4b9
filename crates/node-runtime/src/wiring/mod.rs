//! # Wiring
//!
//! Connects the block feed, the ledger and the query gateway.

pub mod ledger_consumer;
pub mod node;

pub use ledger_consumer::LedgerConsumer;
pub use node::StakeNode;
