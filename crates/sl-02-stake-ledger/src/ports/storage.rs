use crate::domain::{LedgerError, PayoutSnapshot};
use shared_types::Height;
use std::sync::Arc;

/// Durable, write-once payout history.
///
/// `persist` must not return before the snapshot is durable. Persisting a
/// height that already holds identical contents is a no-op success; a height
/// holding different contents is a `SnapshotConflict` and is left untouched.
pub trait SnapshotStore: Send + Sync {
    fn persist(&self, snapshot: &PayoutSnapshot) -> Result<(), LedgerError>;
    fn load(&self, height: Height) -> Result<PayoutSnapshot, LedgerError>;
    /// Persisted heights, ascending.
    fn heights(&self) -> Result<Vec<Height>, LedgerError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn persist(&self, snapshot: &PayoutSnapshot) -> Result<(), LedgerError> {
        (**self).persist(snapshot)
    }

    fn load(&self, height: Height) -> Result<PayoutSnapshot, LedgerError> {
        (**self).load(height)
    }

    fn heights(&self) -> Result<Vec<Height>, LedgerError> {
        (**self).heights()
    }
}
