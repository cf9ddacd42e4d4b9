//! Domain layer for the query gateway.

pub mod config;
pub mod error;
pub mod views;
