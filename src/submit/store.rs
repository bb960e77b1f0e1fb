//! Persisted form snapshot
//!
//! One flat JSON document under a fixed storage name, restored verbatim on
//! the next launch and rewritten whole on every save. A missing or corrupt
//! file falls back to defaults; losing form state is annoying, failing to
//! start over it would be worse.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::LauncherResult;
use crate::submit::types::FormSnapshot;

/// Fixed storage key, shared with the UI's persisted store.
pub const STORAGE_NAME: &str = "dna-optimization-storage";

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store under the platform user-data directory.
    pub fn new() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("dcub").join(format!("{STORAGE_NAME}.json")),
        }
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the snapshot, falling back to defaults when absent or unreadable.
    pub fn load(&self) -> FormSnapshot {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(snapshot) => {
                    debug!(path = %self.path.display(), "restored form snapshot");
                    snapshot
                }
                Err(err) => {
                    warn!(%err, path = %self.path.display(), "snapshot is corrupt, using defaults");
                    FormSnapshot::default()
                }
            },
            Err(_) => FormSnapshot::default(),
        }
    }

    /// Overwrite the whole snapshot.
    pub fn save(&self, snapshot: &FormSnapshot) -> LauncherResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), "form snapshot saved");
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
