//! Session and identity domain models.

use serde::{Deserialize, Serialize};

/// Login request payload.
///
/// The mock backend validates by email lookup only; a real backend would
/// extend this with a password or token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// An authenticated user identity as issued by the backend.
///
/// Immutable once returned; owned exclusively by the session that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// The current authentication session.
///
/// Invariant: `authenticated == user.is_some()`. The container enforces
/// this on every mutation; `normalized` re-establishes it for snapshots
/// rehydrated from storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// The logged-in identity, if any.
    pub user: Option<UserIdentity>,
    /// Mirrors `user.is_some()`.
    pub authenticated: bool,
    /// Message from the last failed login attempt, if any.
    pub error: Option<String>,
    /// True while a login call is in flight.
    #[serde(default)]
    pub loading: bool,
}

impl Session {
    /// Creates the empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repairs a session restored from storage.
    ///
    /// A snapshot written mid-login may carry `loading = true` or an
    /// `authenticated` flag out of step with `user`; neither state is
    /// meaningful after a restart.
    pub fn normalized(mut self) -> Self {
        self.authenticated = self.user.is_some();
        self.loading = false;
        self
    }
}
