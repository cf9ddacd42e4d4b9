//! # Ledger Engine
//!
//! Applies block diffs to the two stake tables.
//!
//! ## Tables
//!
//! - **All-time**: every qualifying unspent deposit, across all periods.
//! - **Period**: the weights for the upcoming payout. Rebased from the all-time
//!   table at each boundary, so an address's next-period weight is its full
//!   holding at the boundary instant.
//!
//! When an address's stake is invalidated it is deleted from both tables. New
//! deposits are only credited to the all-time table.
//!
//! ## Algorithm: Stage, Persist, Commit
//!
//! 1. Check the height is the next expected one.
//! 2. Stage credits for qualifying creations (overflow-checked, no mutation).
//! 3. Collect the addresses consumed by the block.
//! 4. On a boundary, render the period table as it will be after step 3 and
//!    persist it.
//! 5. Commit: credits, then removals, then the rebase.
//!
//! Every fallible step runs before the first mutation, so an error leaves the
//! engine exactly as it was before the call.

use super::{
    BlockOutcome, LedgerConfig, LedgerError, LedgerState, PayoutSnapshot, StakeEntry, StakeTable,
};
use crate::ports::SnapshotStore;
use shared_types::{parse_amount, Amount, Height};
use sl_01_diff_extraction::{BlockDiff, UtxoConsumption, UtxoCreation};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Blocks between progress log lines.
const PROGRESS_LOG_INTERVAL: Height = 100;

pub struct LedgerEngine<S: SnapshotStore> {
    config: LedgerConfig,
    all_time: StakeTable,
    period: StakeTable,
    next_height: Height,
    last_height: Option<Height>,
    store: S,
}

impl<S: SnapshotStore> LedgerEngine<S> {
    /// Create an engine with empty tables expecting `config.stake_start` next.
    pub fn new(config: LedgerConfig, store: S) -> Result<Self, LedgerError> {
        config.validate()?;
        let next_height = config.stake_start;
        Ok(Self {
            config,
            all_time: StakeTable::new(),
            period: StakeTable::new(),
            next_height,
            last_height: None,
            store,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn all_time(&self) -> &StakeTable {
        &self.all_time
    }

    pub fn period(&self) -> &StakeTable {
        &self.period
    }

    pub fn next_height(&self) -> Height {
        self.next_height
    }

    pub fn last_height(&self) -> Option<Height> {
        self.last_height
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deep copy of both tables for publishing to readers.
    pub fn state(&self) -> LedgerState {
        LedgerState {
            height: self.last_height,
            period: self.period.clone(),
            all_time: self.all_time.clone(),
        }
    }

    /// Apply an extracted block diff.
    pub fn apply_diff(&mut self, diff: &BlockDiff) -> Result<BlockOutcome, LedgerError> {
        self.apply_block(diff.height, &diff.creations, &diff.consumptions)
    }

    /// Apply one block. Must be called once per height, in increasing order.
    pub fn apply_block(
        &mut self,
        height: Height,
        creations: &[UtxoCreation],
        consumptions: &[UtxoConsumption],
    ) -> Result<BlockOutcome, LedgerError> {
        if height != self.next_height {
            warn!(
                expected = self.next_height,
                actual = height,
                "[sl-02] Rejecting out-of-order block"
            );
            return Err(LedgerError::NonSequentialBlock {
                expected: self.next_height,
                actual: height,
            });
        }

        let mut outcome = BlockOutcome {
            height,
            ..Default::default()
        };

        // Stage credits.
        let mut staged: HashMap<&str, StakeEntry> = HashMap::new();
        for creation in creations {
            let value = match self.qualify(creation) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    outcome.ignored += 1;
                    continue;
                }
                Err(e) => {
                    debug!(height, error = %e, "[sl-02] Skipping creation");
                    outcome.ignored += 1;
                    continue;
                }
            };

            let address = creation.address.as_str();
            let entry = match staged.get(address) {
                Some(entry) => *entry,
                None => self.all_time.get(address).copied().unwrap_or_default(),
            };
            let credited = credit(entry, value, &self.config.stake_size).ok_or_else(|| {
                LedgerError::AmountOverflow {
                    address: creation.address.clone(),
                }
            })?;
            staged.insert(address, credited);
            outcome.qualified += 1;
        }

        let consumed: HashSet<&str> = consumptions.iter().map(|c| c.address.as_str()).collect();

        // Persist before mutating anything.
        let boundary = self.config.is_payout_boundary(height);
        if boundary {
            let closing = self
                .period
                .iter()
                .filter(|(address, _)| !consumed.contains(address.as_str()));
            let snapshot = PayoutSnapshot::from_entries(height, closing);
            self.store.persist(&snapshot)?;
            outcome.snapshot_height = Some(height);
        }

        // Commit.
        for (address, entry) in staged {
            self.all_time.insert(address.to_string(), entry);
        }
        for address in consumed {
            let in_all_time = self.all_time.remove(address).is_some();
            let in_period = self.period.remove(address).is_some();
            if in_all_time || in_period {
                outcome.removed += 1;
            }
        }
        if boundary {
            self.period = self.all_time.clone();
            info!(
                snapshot_height = height,
                stakers = self.period.len(),
                next_boundary = self.config.next_payout_boundary(height),
                "[sl-02] 📸 Payout period closed, period table rebased"
            );
        }

        self.last_height = Some(height);
        self.next_height = height + 1;

        if height % PROGRESS_LOG_INTERVAL == 0 {
            info!("[sl-02] Live sync height = {}", height);
        }
        debug!(
            height,
            qualified = outcome.qualified,
            ignored = outcome.ignored,
            removed = outcome.removed,
            "[sl-02] Block applied"
        );

        Ok(outcome)
    }

    /// `Ok(Some(value))` for a qualifying creation, `Ok(None)` for a clean
    /// integer that is not a positive multiple of the stake size.
    fn qualify(&self, creation: &UtxoCreation) -> Result<Option<Amount>, LedgerError> {
        let value = parse_amount(&creation.value).map_err(|reason| LedgerError::MalformedValue {
            address: creation.address.clone(),
            value: creation.value.clone(),
            reason,
        })?;

        if creation.address.is_empty() || value.is_zero() {
            return Ok(None);
        }
        if !(value % self.config.stake_size).is_zero() {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

fn credit(entry: StakeEntry, value: Amount, stake_size: &Amount) -> Option<StakeEntry> {
    Some(StakeEntry {
        amount: entry.amount.checked_add(value)?,
        score: entry.score.checked_add(value / *stake_size)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySnapshotStore;
    use shared_types::{UtxoRef, U256};
    use std::sync::Arc;

    const ADDR_X: &str = "DXaddress0000000000000000000000001";
    const ADDR_Y: &str = "DYaddress0000000000000000000000002";

    fn engine() -> LedgerEngine<Arc<InMemorySnapshotStore>> {
        LedgerEngine::new(LedgerConfig::default(), Arc::new(InMemorySnapshotStore::new())).unwrap()
    }

    fn small_engine(store: Arc<InMemorySnapshotStore>) -> LedgerEngine<Arc<InMemorySnapshotStore>> {
        let config = LedgerConfig {
            stake_size: U256::from(100_000u64),
            stake_start: 0,
            payout_interval: 10,
        };
        LedgerEngine::new(config, store).unwrap()
    }

    fn create(txid: &str, address: &str, value: &str) -> UtxoCreation {
        UtxoCreation {
            utxo: UtxoRef::new(txid, 0),
            address: address.to_string(),
            height: 0,
            value: value.to_string(),
        }
    }

    fn spend(txid: &str, address: &str) -> UtxoConsumption {
        UtxoConsumption {
            utxo: UtxoRef::new(txid, 0),
            address: address.to_string(),
        }
    }

    fn entry(amount: u64, score: u64) -> StakeEntry {
        StakeEntry::new(U256::from(amount), U256::from(score))
    }

    /// Feed empty blocks until `height` is next.
    fn advance_to(engine: &mut LedgerEngine<Arc<InMemorySnapshotStore>>, height: Height) {
        while engine.next_height() < height {
            let h = engine.next_height();
            engine.apply_block(h, &[], &[]).unwrap();
        }
    }

    #[test]
    fn test_new_engine_is_empty() {
        let engine = engine();
        assert!(engine.all_time().is_empty());
        assert!(engine.period().is_empty());
        assert_eq!(engine.next_height(), 370_000);
        assert_eq!(engine.last_height(), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LedgerConfig {
            payout_interval: 0,
            ..Default::default()
        };
        assert!(LedgerEngine::new(config, InMemorySnapshotStore::new()).is_err());
    }

    #[test]
    fn test_qualifying_creation_credits_all_time_only() {
        let mut engine = engine();
        advance_to(&mut engine, 370_001);

        let outcome = engine
            .apply_block(370_001, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap();

        assert_eq!(outcome.qualified, 1);
        assert_eq!(engine.all_time()[ADDR_X], entry(100_000, 1));
        assert!(engine.period().is_empty());
    }

    #[test]
    fn test_credits_accumulate_within_and_across_blocks() {
        let mut engine = engine();
        engine
            .apply_block(
                370_000,
                &[create("t1", ADDR_X, "100000"), create("t2", ADDR_X, "300000")],
                &[],
            )
            .unwrap();
        engine
            .apply_block(370_001, &[create("t3", ADDR_X, "200000")], &[])
            .unwrap();

        assert_eq!(engine.all_time()[ADDR_X], entry(600_000, 6));
    }

    #[test]
    fn test_non_qualifying_creations_are_ignored() {
        let mut engine = engine();
        let creations = [
            create("a", ADDR_X, "150000"),
            create("b", ADDR_X, "0"),
            create("c", ADDR_X, "1.5"),
            create("d", ADDR_X, "-100000"),
            create("e", ADDR_X, ""),
            create("f", "", "100000"),
            create("g", ADDR_Y, "100000.0"),
        ];

        let outcome = engine.apply_block(370_000, &creations, &[]).unwrap();

        assert_eq!(outcome.qualified, 0);
        assert_eq!(outcome.ignored, creations.len());
        assert!(engine.all_time().is_empty());
    }

    #[test]
    fn test_consumption_removes_whole_entry_from_both_tables() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = small_engine(store);
        engine
            .apply_block(0, &[create("t1", ADDR_X, "500000")], &[])
            .unwrap();
        advance_to(&mut engine, 10);
        engine.apply_block(10, &[], &[]).unwrap();
        assert!(engine.period().contains_key(ADDR_X));

        // Spending an unrelated output of X still drops all of X.
        let outcome = engine
            .apply_block(11, &[], &[spend("unrelated", ADDR_X)])
            .unwrap();

        assert_eq!(outcome.removed, 1);
        assert!(!engine.all_time().contains_key(ADDR_X));
        assert!(!engine.period().contains_key(ADDR_X));
    }

    #[test]
    fn test_consumption_of_unknown_address_is_noop() {
        let mut engine = engine();
        let outcome = engine
            .apply_block(370_000, &[], &[spend("t", ADDR_Y)])
            .unwrap();
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn test_create_and_spend_in_same_block_nets_to_removed() {
        let mut engine = engine();
        engine
            .apply_block(
                370_000,
                &[create("t1", ADDR_X, "100000")],
                &[spend("t1", ADDR_X)],
            )
            .unwrap();

        assert!(!engine.all_time().contains_key(ADDR_X));
    }

    #[test]
    fn test_non_sequential_block_rejected_without_mutation() {
        let mut engine = engine();
        engine
            .apply_block(370_000, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap();

        let err = engine
            .apply_block(370_002, &[create("t2", ADDR_Y, "100000")], &[])
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NonSequentialBlock {
                expected: 370_001,
                actual: 370_002
            }
        ));

        let replay = engine.apply_block(370_000, &[], &[]).unwrap_err();
        assert!(matches!(replay, LedgerError::NonSequentialBlock { .. }));

        assert_eq!(engine.all_time().len(), 1);
        assert_eq!(engine.next_height(), 370_001);
    }

    #[test]
    fn test_first_block_must_be_stake_start() {
        let mut engine = engine();
        assert!(engine.apply_block(369_999, &[], &[]).is_err());
        assert!(engine.apply_block(370_001, &[], &[]).is_err());
        assert!(engine.apply_block(370_000, &[], &[]).is_ok());
    }

    #[test]
    fn test_boundary_persists_period_then_rebases() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = small_engine(Arc::clone(&store));

        // Period 1: X deposits. Period table is still empty at the first boundary.
        engine
            .apply_block(0, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap();
        advance_to(&mut engine, 10);
        let outcome = engine.apply_block(10, &[], &[]).unwrap();
        assert_eq!(outcome.snapshot_height, Some(10));
        assert!(store.load(10).unwrap().is_empty());
        assert_eq!(engine.period(), engine.all_time());

        // Period 2: Y deposits; boundary snapshot holds X only.
        engine
            .apply_block(11, &[create("t2", ADDR_Y, "300000")], &[])
            .unwrap();
        advance_to(&mut engine, 20);
        engine.apply_block(20, &[], &[]).unwrap();

        let snap = store.load(20).unwrap();
        assert_eq!(snap.scores.len(), 1);
        assert_eq!(snap.scores[ADDR_X], "1");
        assert_eq!(engine.period()[ADDR_Y], entry(300_000, 3));
    }

    #[test]
    fn test_boundary_snapshot_excludes_addresses_spent_in_that_block() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = small_engine(Arc::clone(&store));
        engine
            .apply_block(
                0,
                &[create("t1", ADDR_X, "100000"), create("t2", ADDR_Y, "200000")],
                &[],
            )
            .unwrap();
        advance_to(&mut engine, 10);
        engine.apply_block(10, &[], &[]).unwrap();
        advance_to(&mut engine, 20);

        engine
            .apply_block(20, &[], &[spend("t1", ADDR_X)])
            .unwrap();

        let snap = store.load(20).unwrap();
        assert!(!snap.scores.contains_key(ADDR_X));
        assert_eq!(snap.scores[ADDR_Y], "2");
        assert!(!engine.period().contains_key(ADDR_X));
    }

    #[test]
    fn test_rebased_period_is_independent() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = small_engine(store);
        engine
            .apply_block(0, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap();
        advance_to(&mut engine, 10);
        engine.apply_block(10, &[], &[]).unwrap();

        engine
            .apply_block(11, &[create("t2", ADDR_X, "100000")], &[])
            .unwrap();

        assert_eq!(engine.all_time()[ADDR_X], entry(200_000, 2));
        assert_eq!(engine.period()[ADDR_X], entry(100_000, 1));
    }

    #[test]
    fn test_failed_snapshot_leaves_state_untouched() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = small_engine(Arc::clone(&store));
        advance_to(&mut engine, 10);

        // Occupy height 10 with different contents to force a conflict.
        let mut scores = std::collections::BTreeMap::new();
        scores.insert("someone".to_string(), "1".to_string());
        store
            .persist(&PayoutSnapshot { height: 10, scores })
            .unwrap();

        let before = engine.state();
        let err = engine
            .apply_block(10, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap_err();

        assert!(matches!(err, LedgerError::SnapshotConflict { height: 10 }));
        assert!(err.is_fatal());
        assert_eq!(engine.state(), before);
        assert_eq!(engine.next_height(), 10);
    }

    #[test]
    fn test_overflow_is_fatal_and_atomic() {
        let config = LedgerConfig {
            stake_size: U256::one(),
            stake_start: 0,
            payout_interval: 1_000,
        };
        let mut engine = LedgerEngine::new(config, InMemorySnapshotStore::new()).unwrap();
        let max = U256::MAX.to_string();
        engine
            .apply_block(0, &[create("t1", ADDR_X, &max)], &[])
            .unwrap();

        let err = engine
            .apply_block(
                1,
                &[create("t2", ADDR_Y, "1"), create("t3", ADDR_X, "1")],
                &[],
            )
            .unwrap_err();

        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert!(!engine.all_time().contains_key(ADDR_Y));
        assert_eq!(engine.next_height(), 1);
    }

    #[test]
    fn test_malformed_value_is_not_fatal() {
        let err = LedgerError::MalformedValue {
            address: ADDR_X.into(),
            value: "x".into(),
            reason: shared_types::AmountError::InvalidCharacter('x'),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_state_is_deep_copy() {
        let mut engine = engine();
        engine
            .apply_block(370_000, &[create("t1", ADDR_X, "100000")], &[])
            .unwrap();
        let state = engine.state();

        engine
            .apply_block(370_001, &[], &[spend("t1", ADDR_X)])
            .unwrap();

        assert_eq!(state.height, Some(370_000));
        assert!(state.all_time.contains_key(ADDR_X));
        assert!(!engine.all_time().contains_key(ADDR_X));
    }

    #[test]
    fn test_apply_diff_uses_diff_height() {
        let mut engine = engine();
        let diff = BlockDiff {
            height: 370_000,
            creations: vec![create("t1", ADDR_X, "100000")],
            consumptions: vec![],
        };
        let outcome = engine.apply_diff(&diff).unwrap();
        assert_eq!(outcome.height, 370_000);
        assert_eq!(engine.last_height(), Some(370_000));
    }
}
