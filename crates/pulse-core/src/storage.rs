//! Snapshot storage trait.

use async_trait::async_trait;

use crate::error::Result;

/// Durable, best-effort storage for named state snapshots.
///
/// Mirrors a browser's local storage: a flat namespace of JSON documents
/// keyed by a stable name. Persistence is never a correctness guarantee;
/// the engine works identically when every call here fails.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes a snapshot under the given name, replacing any previous
    /// one. Callers treat failures as best-effort and do not surface
    /// them.
    async fn save(&self, name: &str, snapshot: &serde_json::Value) -> Result<()>;

    /// Reads the snapshot stored under the given name.
    ///
    /// Returns `None` for missing OR corrupt data; the distinction is
    /// deliberately erased so callers fall back to defaults silently.
    async fn load(&self, name: &str) -> Option<serde_json::Value>;
}
