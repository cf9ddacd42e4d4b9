//! # Domain Entities for Diff Extraction
//!
//! ## Type Decisions
//!
//! - `value: String` - Values stay as the node reported them. Qualification
//!   (clean integer, stake-size multiple) is the ledger's decision, so a
//!   malformed value must survive extraction untouched.

use serde::{Deserialize, Serialize};
use shared_types::{Height, UtxoRef};

/// A new output recorded by a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoCreation {
    pub utxo: UtxoRef,
    pub address: String,
    pub height: Height,
    /// Decimal text in smallest units, unvalidated.
    pub value: String,
}

/// An existing output spent by a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoConsumption {
    pub utxo: UtxoRef,
    pub address: String,
}

/// Everything a single block changes in the UTXO set.
///
/// Both lists preserve per-transaction order. There is no ordering contract
/// between the two lists; the ledger applies all creations first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDiff {
    pub height: Height,
    pub creations: Vec<UtxoCreation>,
    pub consumptions: Vec<UtxoConsumption>,
}

impl BlockDiff {
    pub fn is_empty(&self) -> bool {
        self.creations.is_empty() && self.consumptions.is_empty()
    }
}
