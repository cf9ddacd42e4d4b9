//! # Domain Entities for the Stake Ledger
//!
//! ## Type Decisions
//!
//! - `amount`/`score: Amount` (U256) - exact integers, never floats. Score is
//!   always `amount / stake_size`; both are kept so readers need no division.
//! - `StakeTable` is a plain `HashMap` keyed by address text. The live address
//!   count is bounded by real chain state, so no eviction is needed.

use shared_types::{Amount, Height, U256};
use std::collections::HashMap;

use super::LedgerError;

/// Quantum deposit unit, in smallest units.
pub const STAKE_SIZE: u64 = 100_000;

/// First height delivered by the block feed.
pub const STAKE_START: Height = 370_000;

/// Blocks between payout boundaries.
pub const PAYOUT_INTERVAL: u64 = 10_000;

/// Stake recorded for one address.
///
/// ## Invariants
///
/// - `amount % stake_size == 0`
/// - `score == amount / stake_size`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakeEntry {
    pub amount: Amount,
    pub score: Amount,
}

impl StakeEntry {
    pub fn new(amount: Amount, score: Amount) -> Self {
        Self { amount, score }
    }
}

/// Address-keyed stake table.
pub type StakeTable = HashMap<String, StakeEntry>;

/// Ledger parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// A deposit qualifies only as an exact multiple of this.
    pub stake_size: Amount,
    /// Height of the first block; boundaries are counted from here.
    pub stake_start: Height,
    /// Blocks between payout boundaries.
    pub payout_interval: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            stake_size: U256::from(STAKE_SIZE),
            stake_start: STAKE_START,
            payout_interval: PAYOUT_INTERVAL,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.stake_size.is_zero() {
            return Err(LedgerError::InvalidConfig(
                "stake_size cannot be 0".into(),
            ));
        }
        if self.payout_interval == 0 {
            return Err(LedgerError::InvalidConfig(
                "payout_interval cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// `H > stake_start` and `(H - stake_start) % payout_interval == 0`.
    pub fn is_payout_boundary(&self, height: Height) -> bool {
        height > self.stake_start && (height - self.stake_start) % self.payout_interval == 0
    }

    /// First boundary strictly after `height`.
    pub fn next_payout_boundary(&self, height: Height) -> Height {
        if height < self.stake_start {
            return self.stake_start + self.payout_interval;
        }
        let elapsed = height - self.stake_start;
        self.stake_start + (elapsed / self.payout_interval + 1) * self.payout_interval
    }
}

/// Summary of one applied block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: Height,
    /// Creations that credited an address.
    pub qualified: usize,
    /// Creations ignored by the qualification rule.
    pub ignored: usize,
    /// Addresses dropped from at least one table.
    pub removed: usize,
    /// Boundary height, if this block closed a payout period.
    pub snapshot_height: Option<Height>,
}
