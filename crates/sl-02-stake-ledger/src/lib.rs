//! # sl-02-stake-ledger
//!
//! Stake Ledger subsystem: the central state machine of the workspace.
//!
//! ## Role in System
//!
//! - **Single Writer**: Consumes one `BlockDiff` per height, strictly in order
//! - **Dual Tables**: All-time holdings and current-period payout weights
//! - **Payout Snapshotter**: Freezes the period table at every payout boundary
//!   to a write-once `SnapshotStore`, then rebases it from the all-time table
//!
//! ## Flow
//!
//! ```text
//! [Diff Extraction (1)] ──BlockDiff──→ [Stake Ledger (2)] ──LedgerState──→ [Query Gateway (4)]
//!                                             │
//!                                   boundary  │ PayoutSnapshot
//!                                             ↓
//!                                      [SnapshotStore] ──→ [Payout Distribution (3)]
//! ```
//!
//! ## Guarantees
//!
//! - Creations are applied before consumptions within a block
//! - Spending anything from an address drops its whole entry from both tables
//! - A block either applies completely (snapshot persisted first) or not at all

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
