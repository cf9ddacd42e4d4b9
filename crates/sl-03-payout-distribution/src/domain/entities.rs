//! # Distribution Entities
//!
//! ## Type Decisions
//!
//! - `payouts: BTreeMap` - deterministic iteration, so printed payout lists
//!   and funding requests are stable across runs.
//! - Amounts stay `Amount` (U256) until the very edge, where they are rendered
//!   as decimal text.

use serde::Serialize;
use shared_types::{format_amount, Amount};
use std::collections::BTreeMap;

/// Default reward pool per payout period, in smallest units.
pub const DEFAULT_REWARD_POOL: u64 = 500_000;

/// Result of splitting one reward pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    /// address → payout. Only addresses with a positive score appear.
    pub payouts: BTreeMap<String, Amount>,
    /// Sum of all positive scores.
    pub total_score: Amount,
    /// Reward pool the split was computed for.
    pub reward: Amount,
    /// Sum of all payouts. Never exceeds `reward`.
    pub total_paid: Amount,
    /// `reward - total_paid`. Always less than `total_score`.
    pub remainder: Amount,
}

/// Wire form of a `Distribution`, all numbers as decimal text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub payouts: BTreeMap<String, String>,
    pub total_score: String,
    pub reward: String,
    pub total_paid: String,
    pub remainder: String,
}

impl Distribution {
    pub fn len(&self) -> usize {
        self.payouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }

    /// Render for output.
    pub fn report(&self) -> DistributionReport {
        DistributionReport {
            payouts: self
                .payouts
                .iter()
                .map(|(address, amount)| (address.clone(), format_amount(amount)))
                .collect(),
            total_score: format_amount(&self.total_score),
            reward: format_amount(&self.reward),
            total_paid: format_amount(&self.total_paid),
            remainder: format_amount(&self.remainder),
        }
    }
}
