//! In-memory snapshot store.
//!
//! Backs tests and ephemeral runs. Can be constructed with failing
//! writes to exercise the best-effort persistence path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pulse_core::error::{PulseError, Result};
use pulse_core::storage::SnapshotStore;

/// A `HashMap`-backed [`SnapshotStore`].
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    fail_saves: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `save` fails, as a full-quota storage would.
    pub fn with_failing_saves() -> Self {
        Self {
            snapshots: Arc::default(),
            fail_saves: true,
        }
    }

    /// Seeds a snapshot, bypassing `save` (and its failure switch).
    pub async fn seed(&self, name: &str, snapshot: serde_json::Value) {
        self.snapshots
            .write()
            .await
            .insert(name.to_string(), snapshot);
    }

    /// Number of snapshots currently held.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, name: &str, snapshot: &serde_json::Value) -> Result<()> {
        if self.fail_saves {
            return Err(PulseError::persistence("storage quota exceeded"));
        }
        self.snapshots
            .write()
            .await
            .insert(name.to_string(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, name: &str) -> Option<serde_json::Value> {
        self.snapshots.read().await.get(name).cloned()
    }
}
