//! # Stake Ledger Node
//!
//! Consumes the ordered block feed, maintains the stake tables, writes one
//! payout snapshot per boundary and serves read-only views over HTTP.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults + `SL_*` environment)
//! 2. Initialize logging
//! 3. Open the payout history directory
//! 4. Start feed producer, ledger consumer and query gateway
//! 5. Run until Ctrl+C or a fatal ledger error

use anyhow::{Context, Result};
use node_runtime::telemetry::init_tracing;
use node_runtime::{NodeConfig, StakeNode};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.telemetry).context("Failed to initialize logging")?;

    StakeNode::new(config).run().await
}
