use shared_types::{AmountError, Height};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Creation value is not a clean base-10 integer. Never fatal: the
    /// creation is skipped.
    #[error("Malformed value {value:?} for {address}: {reason}")]
    MalformedValue {
        address: String,
        value: String,
        reason: AmountError,
    },

    #[error("Non-sequential block: expected height {expected}, got {actual}")]
    NonSequentialBlock { expected: Height, actual: Height },

    #[error("Snapshot write failed at height {height}: {message}")]
    SnapshotWriteFailure { height: Height, message: String },

    #[error("Snapshot conflict at height {height}: a different snapshot is already persisted")]
    SnapshotConflict { height: Height },

    #[error("Snapshot not found for height {height}")]
    SnapshotNotFound { height: Height },

    #[error("Snapshot corrupted at height {height}: {message}")]
    SnapshotCorrupted { height: Height, message: String },

    #[error("Amount overflow for address {address}")]
    AmountOverflow { address: String },

    #[error("Invalid ledger configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// Fatal errors halt block processing and require an operator.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LedgerError::MalformedValue { .. })
    }
}
