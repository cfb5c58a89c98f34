//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: session and identity domain models
//! - `container`: the observable auth state container

mod container;
mod model;

// Re-export public API
pub use container::AuthState;
pub use model::{Credentials, Session, UserIdentity};
