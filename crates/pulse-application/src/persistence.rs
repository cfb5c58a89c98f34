//! Best-effort snapshot persistence for state containers.
//!
//! Persistence is a decorator over a container, not a property of it:
//! [`restore`] merges a stored snapshot into a container's initial
//! state, [`spawn_autosave`] watches a container and writes every
//! subsequent change back under the same name. Neither direction ever
//! fails the caller; storage trouble degrades to defaults (reads) or is
//! logged and dropped (writes).

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use pulse_core::storage::SnapshotStore;

/// Snapshot name for the auth session.
pub const AUTH_SNAPSHOT: &str = "auth-storage";

/// Snapshot name for the dashboard preferences.
pub const PREFS_SNAPSHOT: &str = "dashboard-preferences";

/// Reads and deserializes the snapshot stored under `name`.
///
/// Returns `None` when the snapshot is missing, unreadable, or does not
/// match the current schema; the caller falls back to defaults in every
/// case.
pub async fn restore<T: DeserializeOwned>(store: &dyn SnapshotStore, name: &str) -> Option<T> {
    let value = store.load(name).await?;
    match serde_json::from_value(value) {
        Ok(state) => {
            tracing::debug!(name, "snapshot restored");
            Some(state)
        }
        Err(err) => {
            tracing::warn!(name, %err, "snapshot does not match current schema, using defaults");
            None
        }
    }
}

/// Handle for a running autosave task.
///
/// The task also ends on its own when the watched container is dropped;
/// dropping the handle aborts it immediately.
pub struct AutosaveHandle {
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Stops the autosave task without waiting for it.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Watches a container and writes each state change under `name`.
///
/// Writes are fire-and-forget: nothing awaits them and failures are
/// logged at warn level, never propagated. Only changes after the spawn
/// are written; the initial value was just restored (or defaulted) and
/// rewriting it would be noise.
pub fn spawn_autosave<T>(
    mut rx: watch::Receiver<T>,
    store: Arc<dyn SnapshotStore>,
    name: &'static str,
) -> AutosaveHandle
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        rx.mark_unchanged();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let value = match serde_json::to_value(&snapshot) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(name, %err, "snapshot serialization failed, skipping write");
                    continue;
                }
            };
            if let Err(err) = store.save(name, &value).await {
                tracing::warn!(name, %err, "snapshot write failed, continuing without persistence");
            }
        }
        tracing::debug!(name, "autosave stopped");
    });
    AutosaveHandle { task }
}
