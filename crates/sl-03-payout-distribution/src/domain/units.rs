//! # Coin Units
//!
//! Conversion between coin-denominated decimal text (`"1.5"`) and smallest
//! units (`150000000`). One coin is 10^8 smallest units.

use super::UnitError;
use shared_types::{parse_amount, Amount, AmountError, U256};

/// Fractional digits of one coin.
pub const COIN_DECIMALS: usize = 8;

/// Parse coin text into smallest units.
///
/// Accepts `"12"`, `"12."`, `"12.5"`, `".5"`. Rejects signs, exponents and
/// more than eight fractional digits.
pub fn to_smallest_unit(text: &str) -> Result<Amount, UnitError> {
    if text.is_empty() {
        return Err(UnitError::Empty);
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitError::Invalid(text.to_string()));
    }
    if fraction.len() > COIN_DECIMALS {
        return Err(UnitError::TooManyDecimals {
            text: text.to_string(),
            max: COIN_DECIMALS,
        });
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = COIN_DECIMALS);
    parse_amount(&digits).map_err(|e| match e {
        AmountError::Overflow => UnitError::Overflow(text.to_string()),
        _ => UnitError::Invalid(text.to_string()),
    })
}

/// Render smallest units as coin text, without trailing zeros.
pub fn from_smallest_unit(amount: &Amount) -> String {
    let coin = U256::exp10(COIN_DECIMALS);
    let whole = *amount / coin;
    let fraction = (*amount % coin).low_u64();

    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = COIN_DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
