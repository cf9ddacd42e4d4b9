use shared_types::AmountError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributionError {
    /// Total score is zero. Fatal for the payout run.
    #[error("Empty distribution: total score is zero")]
    EmptyDistribution,

    #[error("Invalid score for {address}: {reason}")]
    InvalidScore { address: String, reason: AmountError },

    #[error("Arithmetic overflow while summing scores")]
    ArithmeticOverflow,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount {0:?}")]
    Invalid(String),

    #[error("Too many decimal places in {text:?} (max {max})")]
    TooManyDecimals { text: String, max: usize },

    #[error("Amount {0:?} out of range")]
    Overflow(String),
}
