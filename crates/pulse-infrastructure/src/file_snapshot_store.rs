//! File-backed snapshot store.
//!
//! One pretty-printed JSON file per snapshot name under the pulse config
//! directory. All failure modes degrade silently: corrupt or missing
//! files read as `None`, write failures are reported to the caller but
//! treated as best-effort by the persistence layer.

use std::path::PathBuf;

use async_trait::async_trait;

use pulse_core::error::Result;
use pulse_core::storage::SnapshotStore;

use crate::paths::PulsePaths;

/// Stores each named snapshot as `<root>/<name>.json`.
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at the platform config directory.
    pub fn new() -> std::result::Result<Self, crate::paths::PathError> {
        Ok(Self {
            root: PulsePaths::new(None).config_dir()?,
        })
    }

    /// Creates a store rooted at an explicit directory. Tests use this
    /// with a temporary directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, name: &str, snapshot: &serde_json::Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let contents = serde_json::to_string_pretty(snapshot)?;
        tokio::fs::write(self.path_for(name), contents).await?;
        tracing::debug!(name, "snapshot saved");
        Ok(())
    }

    async fn load(&self, name: &str) -> Option<serde_json::Value> {
        let path = self.path_for(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(name, %err, "no snapshot to load");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(name, %err, "discarding corrupt snapshot");
                None
            }
        }
    }
}
