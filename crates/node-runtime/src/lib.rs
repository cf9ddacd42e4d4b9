//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry points are the `stake-node` and `payout` binaries.
//!
//! ## Modular Structure
//!
//! - `container/` - Node configuration (defaults + environment)
//! - `adapters/` - Block feed reader
//! - `wiring/` - Ledger consumer task and node orchestration
//! - `telemetry` - `tracing` subscriber setup

pub mod adapters;
pub mod container;
pub mod telemetry;
pub mod wiring;

pub use container::{ConfigError, NodeConfig};
pub use wiring::{LedgerConsumer, StakeNode};
