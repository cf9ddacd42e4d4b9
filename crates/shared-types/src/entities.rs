//! # Block Feed Entities
//!
//! Decoded blocks as delivered by the external synchronization pipeline.
//!
//! The feed guarantees in-order, exactly-once, reorg-safe delivery. These types
//! only describe the shape of a block; they carry no ordering logic.
//!
//! ## JSON Shape
//!
//! ```text
//! {"height": 370001,
//!  "block": {"txs": [{"vouts": [{"txid": "..", "vout": 0, "type": "pubkeyhash",
//!                                "address": "D..", "value": "100000"}],
//!                     "vins":  [{"txid": "..", "vout": 1, "type": "pubkeyhash",
//!                                "address": "D.."}]}]}}
//! ```

use serde::{Deserialize, Serialize};

/// Output type marking a data-only, unspendable output.
pub const OUTPUT_TYPE_NULLDATA: &str = "nulldata";

/// Input type marking a generation (coinbase) input.
pub const INPUT_TYPE_COINBASE: &str = "coinbase";

/// Block height.
pub type Height = u64;

/// Unique identifier of a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtxoRef {
    /// Transaction ID (hex text as reported by the node).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
}

impl UtxoRef {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }
}

/// A transaction output as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Transaction that created this output.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Script type (`pubkeyhash`, `scripthash`, `nulldata`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination address. Absent for non-standard scripts.
    #[serde(default)]
    pub address: Option<String>,
    /// Value in smallest units as decimal text. Not validated here.
    pub value: String,
}

impl RawOutput {
    /// True for data-only outputs that can never be spent.
    pub fn is_unspendable(&self) -> bool {
        self.kind == OUTPUT_TYPE_NULLDATA
    }
}

/// A transaction input as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Transaction of the output being spent. Absent for coinbase inputs.
    #[serde(default)]
    pub txid: Option<String>,
    /// Index of the output being spent.
    #[serde(default)]
    pub vout: Option<u32>,
    /// Script type of the spent output, or `coinbase`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Address that owned the spent output.
    #[serde(default)]
    pub address: Option<String>,
}

impl RawInput {
    /// True for generation inputs, which spend nothing.
    pub fn is_coinbase(&self) -> bool {
        self.kind == INPUT_TYPE_COINBASE
    }
}

/// A decoded transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub vouts: Vec<RawOutput>,
    #[serde(default)]
    pub vins: Vec<RawInput>,
}

/// A decoded block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub txs: Vec<RawTransaction>,
}

/// One item of the ordered block feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedBlock {
    pub height: Height,
    pub block: RawBlock,
}
