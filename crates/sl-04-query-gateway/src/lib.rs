//! SL-04 Query Gateway - read-only HTTP views of the stake ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     QUERY GATEWAY (sl-04)                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │   GET /current    GET /next    GET /stats    GET /health      │
//! │        │              │            │                          │
//! │   ┌────┴──────────────┴────────────┴────┐                     │
//! │   │   CORS → per-route RateLimit        │                     │
//! │   └────────────────┬────────────────────┘                     │
//! │                    │ borrow latest                            │
//! │   ┌────────────────┴────────────────────┐                     │
//! │   │  watch::Receiver<Arc<LedgerState>>  │                     │
//! │   └────────────────┬────────────────────┘                     │
//! └────────────────────┼─────────────────────────────────────────┘
//!                      │ published after every applied block
//!               sl-02-stake-ledger
//! ```
//!
//! # Routes
//!
//! - `/current`: period table, address → `{amount, score}` as decimal text
//! - `/next`: all-time table (the weights the next period starts from)
//! - `/stats`: `{"totalStaked": "..", "height": ..}`
//! - `/health`: liveness
//!
//! Handlers only ever see a complete published state, never a block in
//! progress.

pub mod domain;
pub mod middleware;
pub mod service;

pub use domain::config::{CorsConfig, GatewayConfig, RateLimitConfig};
pub use domain::error::GatewayError;
pub use domain::views::{mask_address, render_table, EntryView, StatsView, TableView};
pub use middleware::{create_cors_layer, RateLimitLayer};
pub use service::{build_router, serve};
