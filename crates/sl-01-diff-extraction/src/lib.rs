//! # sl-01-diff-extraction
//!
//! Diff Extraction subsystem for the stake ledger.
//!
//! ## Role in System
//!
//! - **Pure Transform**: turns one decoded block into the UTXO creations and
//!   consumptions it implies. No state, no I/O, no validation of values.
//! - **Upstream of the Ledger**: its `BlockDiff` is the only input the
//!   Stake Ledger (sl-02) accepts.
//!
//! ## Flow
//!
//! ```text
//! [Block Feed] ──FeedBlock──→ [Diff Extraction (1)] ──BlockDiff──→ [Stake Ledger (2)]
//! ```
//!
//! ## Filtering Rules
//!
//! - Outputs of type `nulldata` are unspendable and never become creations.
//! - Inputs of type `coinbase` spend nothing and never become consumptions.

pub mod domain;

pub use domain::*;
