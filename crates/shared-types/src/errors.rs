//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors produced while parsing decimal amount text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input was the empty string.
    #[error("Empty amount")]
    Empty,

    /// Input contained something other than ASCII digits.
    #[error("Invalid character in amount: {0:?}")]
    InvalidCharacter(char),

    /// Value does not fit in 256 bits.
    #[error("Amount exceeds 256 bits")]
    Overflow,
}
