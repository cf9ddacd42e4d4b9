use crate::domain::{LedgerError, PayoutSnapshot};
use crate::ports::SnapshotStore;
use shared_types::Height;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory implementation of SnapshotStore for testing
pub struct InMemorySnapshotStore {
    snapshots: RwLock<BTreeMap<Height, PayoutSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn persist(&self, snapshot: &PayoutSnapshot) -> Result<(), LedgerError> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?;

        match snapshots.get(&snapshot.height) {
            Some(existing) if existing == snapshot => Ok(()),
            Some(_) => Err(LedgerError::SnapshotConflict {
                height: snapshot.height,
            }),
            None => {
                snapshots.insert(snapshot.height, snapshot.clone());
                Ok(())
            }
        }
    }

    fn load(&self, height: Height) -> Result<PayoutSnapshot, LedgerError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?;
        snapshots
            .get(&height)
            .cloned()
            .ok_or(LedgerError::SnapshotNotFound { height })
    }

    fn heights(&self) -> Result<Vec<Height>, LedgerError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?;
        Ok(snapshots.keys().copied().collect())
    }
}
