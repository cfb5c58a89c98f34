//! Observable authentication state container.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::model::{Credentials, Session};
use crate::backend::DashboardBackend;

/// The authentication state container.
///
/// Owns the current [`Session`] behind a `tokio::sync::watch` channel:
/// this container is the single writer, presentation code holds
/// read-only receivers obtained via [`AuthState::subscribe`].
///
/// The backend collaborator is injected at construction so the container
/// can be exercised against fixtures in tests.
pub struct AuthState {
    backend: Arc<dyn DashboardBackend>,
    state: watch::Sender<Session>,
}

impl AuthState {
    /// Creates a container holding the empty session.
    pub fn new(backend: Arc<dyn DashboardBackend>) -> Self {
        Self::with_initial(backend, Session::new())
    }

    /// Creates a container from a rehydrated session snapshot.
    ///
    /// The snapshot is normalized first: a session persisted mid-login
    /// must not restore as loading or claim authentication without an
    /// identity.
    pub fn with_initial(backend: Arc<dyn DashboardBackend>, initial: Session) -> Self {
        let (state, _) = watch::channel(initial.normalized());
        Self { backend, state }
    }

    /// Returns a read-only observer of the session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Returns a clone of the current session.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Attempts to log in with the given credentials.
    ///
    /// Exactly one backend attempt per call; the caller decides whether
    /// to re-invoke. The outcome is folded into the session rather than
    /// returned as an error:
    ///
    /// - success: `user` set, `authenticated = true`, returns `true`
    /// - failure: `error` set to the backend's message,
    ///   `authenticated = false`, returns `false`
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.state.send_modify(|session| {
            session.loading = true;
            session.error = None;
        });

        match self.backend.login(credentials).await {
            Ok(user) => {
                tracing::debug!(email = %user.email, "login succeeded");
                self.state.send_modify(|session| {
                    session.user = Some(user);
                    session.authenticated = true;
                    session.loading = false;
                });
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "login failed");
                self.state.send_modify(|session| {
                    session.user = None;
                    session.authenticated = false;
                    session.error = Some(err.to_string());
                    session.loading = false;
                });
                false
            }
        }
    }

    /// Unconditionally resets to the empty session, clearing any error.
    ///
    /// The mock backend has no server-side session to revoke; a real
    /// implementation must add an explicit revocation call here.
    pub fn logout(&self) {
        tracing::debug!("logout");
        self.state.send_modify(|session| *session = Session::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::model::UserIdentity;
    use crate::error::{PulseError, Result};
    use crate::metrics::{DateRange, Series};
    use async_trait::async_trait;

    /// Fixture backend: one known identity, no latency, no flakiness.
    struct FixtureBackend;

    #[async_trait]
    impl DashboardBackend for FixtureBackend {
        async fn login(&self, credentials: &Credentials) -> Result<UserIdentity> {
            if credentials.email == "john.doe@example.com" {
                Ok(UserIdentity {
                    id: "1".to_string(),
                    name: "John Doe".to_string(),
                    email: credentials.email.clone(),
                    token: "mock-jwt-token-johndoe".to_string(),
                })
            } else {
                Err(PulseError::credentials(
                    "Invalid credentials. Please check your email and try again.",
                ))
            }
        }

        async fn fetch_series(&self, _range: DateRange) -> Result<Series> {
            Ok(Vec::new())
        }
    }

    fn auth() -> AuthState {
        AuthState::new(Arc::new(FixtureBackend))
    }

    #[tokio::test]
    async fn test_login_success_populates_session() {
        let auth = auth();
        let ok = auth.login(&Credentials::new("john.doe@example.com")).await;
        assert!(ok);

        let session = auth.current();
        assert!(session.authenticated);
        assert_eq!(session.user.as_ref().unwrap().name, "John Doe");
        assert!(session.error.is_none());
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn test_login_failure_sets_error() {
        let auth = auth();
        let ok = auth.login(&Credentials::new("nonexistent@x.com")).await;
        assert!(!ok);

        let session = auth.current();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert!(!session.error.as_deref().unwrap_or_default().is_empty());
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn test_failed_login_clears_previous_identity() {
        let auth = auth();
        assert!(auth.login(&Credentials::new("john.doe@example.com")).await);
        assert!(!auth.login(&Credentials::new("nonexistent@x.com")).await);

        let session = auth.current();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
    }

    #[tokio::test]
    async fn test_logout_resets_regardless_of_prior_state() {
        let auth = auth();
        assert!(auth.login(&Credentials::new("john.doe@example.com")).await);

        auth.logout();
        assert_eq!(auth.current(), Session::new());

        // A second logout from the empty state is also a clean reset.
        auth.logout();
        assert_eq!(auth.current(), Session::new());
    }

    #[tokio::test]
    async fn test_observers_see_login_transitions() {
        let auth = auth();
        let mut rx = auth.subscribe();

        assert!(auth.login(&Credentials::new("john.doe@example.com")).await);
        // The receiver was marked changed by the transitions above.
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().authenticated);
    }
}
