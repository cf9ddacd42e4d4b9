//! # Exact Amounts
//!
//! `Amount` is the only numeric type used for balances, scores and payouts.
//!
//! ## Type Decisions
//!
//! - `U256` rather than `u128`: chain values are delivered as unbounded decimal
//!   text. 256 bits covers every realistic supply with headroom for score
//!   products, and anything larger is rejected as malformed instead of wrapping.
//! - Parsing is strict base-10: ASCII digits only. No sign, no fraction, no
//!   whitespace, no exponent.

use crate::errors::AmountError;

pub use primitive_types::{U256, U512};

/// Balance, score or payout in smallest currency units.
pub type Amount = U256;

/// Parse clean base-10 integer text into an `Amount`.
///
/// Leading zeros are accepted (`"007"` is 7), matching a `^\d+$` check.
pub fn parse_amount(text: &str) -> Result<Amount, AmountError> {
    if text.is_empty() {
        return Err(AmountError::Empty);
    }

    if let Some(ch) = text.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(ch));
    }
    // Only digits remain, so the one possible failure is width.
    U256::from_dec_str(text).map_err(|_| AmountError::Overflow)
}

/// Render an `Amount` as base-10 text.
pub fn format_amount(amount: &Amount) -> String {
    amount.to_string()
}
