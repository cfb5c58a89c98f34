//! Infrastructure layer: concrete collaborators behind the core seams.
//!
//! Provides the file and in-memory snapshot stores, the mock backend,
//! runtime configuration loading, and path management.

pub mod config_service;
pub mod file_snapshot_store;
pub mod memory_snapshot_store;
pub mod mock_backend;
pub mod paths;

pub use crate::config_service::{load_config, load_config_from};
pub use crate::file_snapshot_store::FileSnapshotStore;
pub use crate::memory_snapshot_store::MemorySnapshotStore;
pub use crate::mock_backend::MockBackend;
