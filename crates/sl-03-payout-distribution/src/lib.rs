//! # sl-03-payout-distribution
//!
//! Payout Distribution subsystem: turns one persisted `PayoutSnapshot` and a
//! reward pool into per-address payout amounts.
//!
//! ## Rule
//!
//! ```text
//! T = Σ score            (zero scores excluded)
//! payout(A) = floor(score(A) × R / T)
//! remainder = R − Σ payout   (kept by the operator, never redistributed)
//! ```
//!
//! The product `score × R` is formed in 512 bits, so no intermediate value can
//! overflow for any pair of 256-bit operands.
//!
//! The crate does not sign or broadcast anything. The result is handed to an
//! external funding pipeline.

pub mod domain;

pub use domain::*;
