//! Dashboard preference domain module.
//!
//! # Module Structure
//!
//! - `model`: the persisted preference document
//! - `container`: the observable preference state container

mod container;
mod model;

// Re-export public API
pub use container::PreferenceState;
pub use model::DashboardPreferences;
