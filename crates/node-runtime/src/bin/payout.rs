//! # Payout Tool
//!
//! Reads one `history/<height>.payout.json` snapshot and prints the reward
//! split: one `address -> amount` line per payee, then a JSON document with
//! the full result. Amounts are in smallest units.
//!
//! Nothing is signed or broadcast; the output is meant for the funding
//! pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use node_runtime::container::TelemetryConfig;
use node_runtime::telemetry::init_tracing;
use shared_types::{Amount, U256};
use sl_02_stake_ledger::read_snapshot_file;
use sl_03_payout_distribution::{distribute, from_smallest_unit, to_smallest_unit, DEFAULT_REWARD_POOL};
use std::path::PathBuf;
use tracing::info;

/// Split a reward pool over a persisted payout snapshot.
#[derive(Parser, Debug)]
#[command(name = "payout")]
#[command(about = "Compute per-address payouts for one payout snapshot")]
struct Args {
    /// Snapshot file, e.g. history/380000.payout.json
    snapshot: PathBuf,

    /// Reward pool in coins (e.g. "0.005")
    #[arg(long, conflicts_with = "reward_units")]
    reward: Option<String>,

    /// Reward pool in smallest units
    #[arg(long)]
    reward_units: Option<String>,

    /// Print only the JSON document
    #[arg(long)]
    json: bool,
}

fn reward_pool(args: &Args) -> Result<Amount> {
    if let Some(coins) = &args.reward {
        return to_smallest_unit(coins).with_context(|| format!("Invalid --reward {:?}", coins));
    }
    if let Some(units) = &args.reward_units {
        return shared_types::parse_amount(units)
            .with_context(|| format!("Invalid --reward-units {:?}", units));
    }
    Ok(U256::from(DEFAULT_REWARD_POOL))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = TelemetryConfig {
        log_level: std::env::var("SL_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        json_logs: false,
    };
    init_tracing(&telemetry).context("Failed to initialize logging")?;

    let reward = reward_pool(&args)?;

    info!("Reading history file: {}", args.snapshot.display());
    let snapshot = read_snapshot_file(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot.display()))?;

    let distribution = distribute(&snapshot, reward).context("Failed to compute payouts")?;

    if !args.json {
        for (address, amount) in &distribution.payouts {
            println!("  {} -> {}", address, amount);
        }
        info!(
            reward = %from_smallest_unit(&reward),
            paid = %from_smallest_unit(&distribution.total_paid),
            remainder = %distribution.remainder,
            "Payout totals (coins, remainder in smallest units)"
        );
    }

    let report = serde_json::to_string_pretty(&distribution.report())
        .context("Failed to render payout report")?;
    println!("{}", report);
    Ok(())
}
