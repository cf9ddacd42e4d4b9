//! # Shared Types Crate
//!
//! This crate contains the block feed entities delivered by the external
//! synchronization pipeline and the exact integer `Amount` used by every
//! subsystem that touches stake balances or payouts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Exact Arithmetic**: Amounts are 256-bit unsigned integers in smallest
//!   currency units. Floating point never enters amount or score computation.
//! - **Decimal Text at the Edges**: Values cross process boundaries as base-10
//!   text so consumers without big-integer support lose no precision.

pub mod amount;
pub mod entities;
pub mod errors;

pub use amount::*;
pub use entities::*;
pub use errors::*;
