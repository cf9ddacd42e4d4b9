//! # Reward Split
//!
//! Floor division per payee. The remainder is reported, never redistributed.

use super::{Distribution, DistributionError};
use shared_types::{parse_amount, Amount, U256, U512};
use sl_02_stake_ledger::PayoutSnapshot;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Split `reward` over the scores frozen in `snapshot`.
pub fn distribute(
    snapshot: &PayoutSnapshot,
    reward: Amount,
) -> Result<Distribution, DistributionError> {
    let mut scores = Vec::with_capacity(snapshot.len());
    for (address, text) in &snapshot.scores {
        let score = parse_amount(text).map_err(|reason| DistributionError::InvalidScore {
            address: address.clone(),
            reason,
        })?;
        scores.push((address, score));
    }

    let result = split(scores, reward)?;
    info!(
        snapshot_height = snapshot.height,
        payees = result.len(),
        total_score = %result.total_score,
        total_paid = %result.total_paid,
        remainder = %result.remainder,
        "[sl-03] 💰 Payout distribution computed"
    );
    Ok(result)
}

/// Split `reward` over already-parsed scores.
pub fn split<'a, I>(scores: I, reward: Amount) -> Result<Distribution, DistributionError>
where
    I: IntoIterator<Item = (&'a String, Amount)>,
{
    let positive: Vec<(&String, Amount)> = scores
        .into_iter()
        .filter(|(_, score)| !score.is_zero())
        .collect();

    let total_score = positive
        .iter()
        .try_fold(U256::zero(), |acc, (_, score)| acc.checked_add(*score))
        .ok_or(DistributionError::ArithmeticOverflow)?;
    if total_score.is_zero() {
        return Err(DistributionError::EmptyDistribution);
    }

    let divisor = U512::from(total_score);
    let mut payouts = BTreeMap::new();
    let mut total_paid = U256::zero();
    for (address, score) in positive {
        // score <= total_score, so the quotient is at most `reward`.
        let share = score.full_mul(reward) / divisor;
        let share = U256::try_from(share).map_err(|_| DistributionError::ArithmeticOverflow)?;
        total_paid = total_paid
            .checked_add(share)
            .ok_or(DistributionError::ArithmeticOverflow)?;
        debug!(address = %address, score = %score, payout = %share, "[sl-03] Payee");
        payouts.insert(address.clone(), share);
    }

    Ok(Distribution {
        payouts,
        total_score,
        reward,
        total_paid,
        remainder: reward - total_paid,
    })
}
