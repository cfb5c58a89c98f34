//! Application layer for Pulse.
//!
//! Coordinates the core containers with the infrastructure
//! collaborators: snapshot persistence, the data refresh controller,
//! the live update simulator, and the top-level application context
//! that owns them all.

pub mod context;
pub mod live;
pub mod persistence;
pub mod refresh;

pub use context::AppContext;
pub use live::{DEFAULT_TICK_PERIOD, LiveTicker};
pub use persistence::{AUTH_SNAPSHOT, AutosaveHandle, PREFS_SNAPSHOT, restore, spawn_autosave};
pub use refresh::RefreshController;
