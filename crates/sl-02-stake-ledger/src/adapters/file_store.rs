use crate::domain::{LedgerError, PayoutSnapshot};
use crate::ports::SnapshotStore;
use shared_types::Height;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_SUFFIX: &str = ".payout.json";

/// File-backed payout history.
///
/// One JSON file per boundary: `<dir>/<height>.payout.json`. Each write goes to
/// a temp file that is fsynced and then renamed into place, and the directory
/// is fsynced after the rename. A crash never leaves a half-written snapshot
/// under its final name, and a completed `persist` survives power loss.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open (creating if needed) the history directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LedgerError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            LedgerError::StorageError(format!("cannot create {}: {}", dir.display(), e))
        })?;

        tracing::info!("[sl-02] 📁 Payout history at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, height: Height) -> PathBuf {
        self.dir.join(PayoutSnapshot::file_name(height))
    }

    fn write_new(&self, path: &Path, height: Height, bytes: &[u8]) -> Result<(), LedgerError> {
        let write_err = |e: std::io::Error| LedgerError::SnapshotWriteFailure {
            height,
            message: e.to_string(),
        };

        let temp_path = path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(bytes).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        std::fs::rename(&temp_path, path).map_err(write_err)?;
        self.sync_dir().map_err(write_err)
    }

    /// Make the rename itself durable.
    #[cfg(unix)]
    fn sync_dir(&self) -> std::io::Result<()> {
        std::fs::File::open(&self.dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn persist(&self, snapshot: &PayoutSnapshot) -> Result<(), LedgerError> {
        let height = snapshot.height;
        let path = self.path_for(height);
        let bytes = snapshot.to_json_bytes()?;

        match std::fs::read(&path) {
            Ok(existing) if existing == bytes => {
                tracing::info!(
                    snapshot_height = height,
                    "[sl-02] Snapshot already persisted with identical contents"
                );
                return Ok(());
            }
            Ok(_) => {
                tracing::error!(
                    snapshot_height = height,
                    path = %path.display(),
                    "[sl-02] Refusing to overwrite a different snapshot"
                );
                return Err(LedgerError::SnapshotConflict { height });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LedgerError::SnapshotWriteFailure {
                    height,
                    message: e.to_string(),
                })
            }
        }

        self.write_new(&path, height, &bytes)?;
        tracing::info!(
            snapshot_height = height,
            addresses = snapshot.len(),
            "[sl-02] 💾 Payout snapshot persisted"
        );
        Ok(())
    }

    fn load(&self, height: Height) -> Result<PayoutSnapshot, LedgerError> {
        let path = self.path_for(height);
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LedgerError::SnapshotNotFound { height },
            _ => LedgerError::StorageError(format!("cannot read {}: {}", path.display(), e)),
        })?;
        PayoutSnapshot::from_json_bytes(height, &bytes)
    }

    fn heights(&self) -> Result<Vec<Height>, LedgerError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| LedgerError::StorageError(e.to_string()))?;

        let mut heights = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LedgerError::StorageError(e.to_string()))?;
            let name = entry.file_name();
            if let Some(height) = name
                .to_str()
                .and_then(|n| n.strip_suffix(SNAPSHOT_SUFFIX))
                .and_then(|h| h.parse::<Height>().ok())
            {
                heights.push(height);
            }
        }
        heights.sort_unstable();
        Ok(heights)
    }
}

/// Read a snapshot file from an arbitrary path.
///
/// The height is taken from a `<height>.payout.json` file name when present,
/// otherwise it is reported as 0.
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> Result<PayoutSnapshot, LedgerError> {
    let path = path.as_ref();
    let height = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(SNAPSHOT_SUFFIX))
        .and_then(|h| h.parse::<Height>().ok())
        .unwrap_or(0);

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LedgerError::SnapshotNotFound { height },
        _ => LedgerError::StorageError(format!("cannot read {}: {}", path.display(), e)),
    })?;
    PayoutSnapshot::from_json_bytes(height, &bytes)
}
