//! # Payout Snapshots
//!
//! The durable record of one closed payout period: address → score, both as
//! text. Scores are rendered in decimal so that any JSON consumer can read
//! them without big-integer support.
//!
//! ## Serialization
//!
//! A snapshot is serialized as a bare JSON object (`{"D..": "3", ...}`). Keys
//! are sorted, so the same contents always produce the same bytes. The store
//! relies on this to tell an idempotent rewrite from a conflicting one.

use super::{LedgerError, StakeEntry};
use shared_types::{format_amount, parse_amount, Height};
use std::collections::BTreeMap;

/// Score table frozen at a payout boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutSnapshot {
    pub height: Height,
    /// address → score (decimal text).
    pub scores: BTreeMap<String, String>,
}

impl PayoutSnapshot {
    /// Render entries as address → score.
    pub fn from_entries<'a, I>(height: Height, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a StakeEntry)>,
    {
        let scores = entries
            .into_iter()
            .map(|(address, entry)| (address.clone(), format_amount(&entry.score)))
            .collect();
        Self { height, scores }
    }

    /// File name used by the on-disk history layout.
    pub fn file_name(height: Height) -> String {
        format!("{}.payout.json", height)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(&self.scores).map_err(|e| LedgerError::SnapshotWriteFailure {
            height: self.height,
            message: e.to_string(),
        })
    }

    /// Parse a persisted snapshot, rejecting any score that is not a clean
    /// base-10 integer.
    pub fn from_json_bytes(height: Height, bytes: &[u8]) -> Result<Self, LedgerError> {
        let scores: BTreeMap<String, String> =
            serde_json::from_slice(bytes).map_err(|e| LedgerError::SnapshotCorrupted {
                height,
                message: e.to_string(),
            })?;

        for (address, score) in &scores {
            parse_amount(score).map_err(|e| LedgerError::SnapshotCorrupted {
                height,
                message: format!("score for {}: {}", address, e),
            })?;
        }

        Ok(Self { height, scores })
    }
}
