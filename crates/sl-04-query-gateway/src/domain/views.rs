//! # Read Views
//!
//! Rendering of published ledger state into the JSON served by the routes.
//! All numbers are decimal text; clients need no big-integer support.

use serde::Serialize;
use shared_types::{format_amount, Height};
use sl_02_stake_ledger::{LedgerState, StakeTable};
use std::collections::BTreeMap;

/// Characters of an address hidden by masking.
const MASKED_PREFIX_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub amount: String,
    pub score: String,
}

/// address → entry, sorted by address.
pub type TableView = BTreeMap<String, EntryView>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_staked: String,
    /// Last applied height; `null` before the first block.
    pub height: Option<Height>,
}

impl StatsView {
    pub fn from_state(state: &LedgerState) -> Self {
        Self {
            total_staked: format_amount(&state.total_period_amount()),
            height: state.height,
        }
    }
}

/// `"..."` followed by the address from its 21st character on.
pub fn mask_address(address: &str) -> String {
    let tail: String = address.chars().skip(MASKED_PREFIX_LEN).collect();
    format!("...{}", tail)
}

/// Render a stake table, optionally with masked keys.
///
/// Masking is lossy: addresses that share everything from the 21st character
/// on collapse into one key. Entries are rendered in address order, so the
/// lexicographically greatest colliding address is the one shown.
pub fn render_table(table: &StakeTable, mask: bool) -> TableView {
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    entries
        .into_iter()
        .map(|(address, entry)| {
            let key = if mask {
                mask_address(address)
            } else {
                address.clone()
            };
            (
                key,
                EntryView {
                    amount: format_amount(&entry.amount),
                    score: format_amount(&entry.score),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;
    use sl_02_stake_ledger::StakeEntry;

    const ADDR: &str = "DTE3TFVBy69od8XaRPVHoDfrucgMFjVzYc";

    fn table() -> StakeTable {
        let mut table = StakeTable::new();
        table.insert(
            ADDR.to_string(),
            StakeEntry::new(U256::from(300_000u64), U256::from(3u64)),
        );
        table
    }

    #[test]
    fn test_mask_address() {
        assert_eq!(mask_address(ADDR), "...oDfrucgMFjVzYc");
        assert_eq!(mask_address("short"), "...");
    }

    #[test]
    fn test_render_table_decimal_text() {
        let view = render_table(&table(), false);
        assert_eq!(
            view[ADDR],
            EntryView {
                amount: "300000".into(),
                score: "3".into()
            }
        );
    }

    #[test]
    fn test_render_table_masked() {
        let view = render_table(&table(), true);
        assert!(view.contains_key("...oDfrucgMFjVzYc"));
        assert!(!view.contains_key(ADDR));
    }

    #[test]
    fn test_masking_collision_keeps_greatest_address() {
        let tail = "oDfrucgMFjVzYc";
        let low = format!("DAAAAAAAAAAAAAAAAAAA{}", tail);
        let high = format!("DZZZZZZZZZZZZZZZZZZZ{}", tail);

        let mut table = StakeTable::new();
        table.insert(low, StakeEntry::new(U256::from(100_000u64), U256::one()));
        table.insert(
            high,
            StakeEntry::new(U256::from(500_000u64), U256::from(5u64)),
        );

        let view = render_table(&table, true);
        assert_eq!(view.len(), 1);
        assert_eq!(view["...oDfrucgMFjVzYc"].amount, "500000");

        // Unmasked, both survive.
        assert_eq!(render_table(&table, false).len(), 2);
    }

    #[test]
    fn test_stats_json_shape() {
        let mut state = LedgerState {
            period: table(),
            ..Default::default()
        };
        let json = serde_json::to_value(StatsView::from_state(&state)).unwrap();
        assert_eq!(json, serde_json::json!({"totalStaked": "300000", "height": null}));

        state.height = Some(370_005);
        let json = serde_json::to_value(StatsView::from_state(&state)).unwrap();
        assert_eq!(json["height"], 370_005);
    }
}
