//! # Node Configuration
//!
//! Unified configuration for the ledger, the block feed, the history store
//! and the query gateway. Defaults match the production deployment; every
//! field can be overridden from the environment.
//!
//! ## Environment Variables
//!
//! | Variable                    | Default     |
//! |-----------------------------|-------------|
//! | `SL_STAKE_SIZE`             | `100000`    |
//! | `SL_STAKE_START`            | `370000`    |
//! | `SL_PAYOUT_INTERVAL`        | `10000`     |
//! | `SL_HISTORY_DIR`            | `./history` |
//! | `SL_BLOCK_FEED`             | `-` (stdin) |
//! | `SL_FEED_BUFFER`            | `64`        |
//! | `SL_HTTP_HOST`              | `0.0.0.0`   |
//! | `SL_HTTP_PORT`              | `80`        |
//! | `SL_RATE_LIMIT_PER_WINDOW`  | `5`         |
//! | `SL_RATE_LIMIT_WINDOW_SECS` | `1`         |
//! | `SL_TRUST_FORWARDED`        | `false`     |
//! | `SL_MASK_ADDRESSES`         | `false`     |
//! | `SL_LOG_LEVEL` / `RUST_LOG` | `info`      |
//! | `SL_JSON_LOGS`              | `false`     |

use shared_types::parse_amount;
use sl_02_stake_ledger::LedgerConfig;
use sl_04_query_gateway::GatewayConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Ledger parameters.
    pub ledger: LedgerConfig,
    /// Payout history storage.
    pub storage: StorageConfig,
    /// Block feed.
    pub feed: FeedConfig,
    /// Query gateway.
    pub gateway: GatewayConfig,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unparseable value.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Values parse but do not make a working node.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `<height>.payout.json` files.
    pub history_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("./history"),
        }
    }
}

/// Where feed blocks are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Stdin,
    File(PathBuf),
}

impl FromStr for FeedSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => FeedSource::Stdin,
            path => FeedSource::File(PathBuf::from(path)),
        })
    }
}

/// Block feed configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub source: FeedSource,
    /// Capacity of the producer → ledger channel.
    pub buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::Stdin,
            buffer: 64,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive.
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SL_STAKE_SIZE") {
            config.ledger.stake_size =
                parse_amount(&value).map_err(|e| invalid("SL_STAKE_SIZE", &value, e))?;
        }
        if let Some(value) = lookup("SL_STAKE_START") {
            config.ledger.stake_start = parse("SL_STAKE_START", &value)?;
        }
        if let Some(value) = lookup("SL_PAYOUT_INTERVAL") {
            config.ledger.payout_interval = parse("SL_PAYOUT_INTERVAL", &value)?;
        }

        if let Some(value) = lookup("SL_HISTORY_DIR") {
            config.storage.history_dir = PathBuf::from(value);
        }

        if let Some(value) = lookup("SL_BLOCK_FEED") {
            config.feed.source = parse("SL_BLOCK_FEED", &value)?;
        }
        if let Some(value) = lookup("SL_FEED_BUFFER") {
            config.feed.buffer = parse("SL_FEED_BUFFER", &value)?;
        }

        if let Some(value) = lookup("SL_HTTP_HOST") {
            config.gateway.host = parse("SL_HTTP_HOST", &value)?;
        }
        if let Some(value) = lookup("SL_HTTP_PORT") {
            config.gateway.port = parse("SL_HTTP_PORT", &value)?;
        }
        if let Some(value) = lookup("SL_RATE_LIMIT_PER_WINDOW") {
            config.gateway.rate_limit.requests_per_window =
                parse("SL_RATE_LIMIT_PER_WINDOW", &value)?;
        }
        if let Some(value) = lookup("SL_RATE_LIMIT_WINDOW_SECS") {
            let secs: u64 = parse("SL_RATE_LIMIT_WINDOW_SECS", &value)?;
            config.gateway.rate_limit.window = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("SL_TRUST_FORWARDED") {
            config.gateway.rate_limit.trust_forwarded_headers = parse_flag(&value);
        }
        if let Some(value) = lookup("SL_MASK_ADDRESSES") {
            config.gateway.mask_addresses = parse_flag(&value);
        }

        if let Some(value) = lookup("SL_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.telemetry.log_level = value;
        }
        if let Some(value) = lookup("SL_JSON_LOGS") {
            config.telemetry.json_logs = parse_flag(&value);
        }

        Ok(config)
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.gateway
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.feed.buffer == 0 {
            return Err(ConfigError::Invalid("feed buffer cannot be 0".into()));
        }
        Ok(())
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| invalid(key, value, e))
}

fn invalid(key: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ledger, LedgerConfig::default());
        assert_eq!(config.storage.history_dir, PathBuf::from("./history"));
        assert_eq!(config.feed.source, FeedSource::Stdin);
        assert_eq!(config.gateway.http_addr().to_string(), "0.0.0.0:80");
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("SL_STAKE_SIZE", "50000"),
            ("SL_STAKE_START", "1000"),
            ("SL_PAYOUT_INTERVAL", "10"),
            ("SL_HISTORY_DIR", "/var/lib/stake/history"),
            ("SL_BLOCK_FEED", "/tmp/blocks.jsonl"),
            ("SL_HTTP_HOST", "127.0.0.1"),
            ("SL_HTTP_PORT", "8080"),
            ("SL_RATE_LIMIT_PER_WINDOW", "10"),
            ("SL_RATE_LIMIT_WINDOW_SECS", "2"),
            ("SL_MASK_ADDRESSES", "true"),
            ("RUST_LOG", "debug"),
            ("SL_JSON_LOGS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.ledger.stake_size, U256::from(50_000u64));
        assert_eq!(config.ledger.stake_start, 1_000);
        assert_eq!(config.ledger.payout_interval, 10);
        assert_eq!(
            config.storage.history_dir,
            PathBuf::from("/var/lib/stake/history")
        );
        assert_eq!(
            config.feed.source,
            FeedSource::File(PathBuf::from("/tmp/blocks.jsonl"))
        );
        assert_eq!(config.gateway.http_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.gateway.rate_limit.requests_per_window, 10);
        assert_eq!(config.gateway.rate_limit.window, Duration::from_secs(2));
        assert!(config.gateway.mask_addresses);
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_sl_log_level_wins_over_rust_log() {
        let config =
            NodeConfig::from_lookup(lookup(&[("SL_LOG_LEVEL", "warn"), ("RUST_LOG", "debug")]))
                .unwrap();
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_unparseable_value_names_key() {
        let err = NodeConfig::from_lookup(lookup(&[("SL_HTTP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SL_HTTP_PORT", .. }));

        let err = NodeConfig::from_lookup(lookup(&[("SL_STAKE_SIZE", "1e5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SL_STAKE_SIZE", .. }));
    }

    #[test]
    fn test_validate_rejects_zero_parameters() {
        for pairs in [
            [("SL_STAKE_SIZE", "0")],
            [("SL_PAYOUT_INTERVAL", "0")],
            [("SL_RATE_LIMIT_PER_WINDOW", "0")],
            [("SL_FEED_BUFFER", "0")],
        ] {
            let config = NodeConfig::from_lookup(lookup(&pairs)).unwrap();
            assert!(config.validate().is_err(), "{:?} should be rejected", pairs);
        }
    }
}
