//! # Published Ledger State
//!
//! Immutable copy of both tables taken after a block has been fully applied.
//! The ledger owner publishes one per block; readers never see the live
//! tables, so they can never observe a partially applied block.

use super::StakeTable;
use shared_types::{Amount, Height};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    /// Last applied height. `None` before the first block.
    pub height: Option<Height>,
    /// Current-period table (weights for the upcoming payout).
    pub period: StakeTable,
    /// All-time table (weights the next period will be seeded with).
    pub all_time: StakeTable,
}

impl LedgerState {
    /// Sum of all period amounts.
    ///
    /// Saturating; each amount was range-checked when it was credited.
    pub fn total_period_amount(&self) -> Amount {
        self.period
            .values()
            .fold(Amount::zero(), |acc, entry| acc.saturating_add(entry.amount))
    }
}
