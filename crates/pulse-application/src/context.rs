//! Top-level application context.
//!
//! Owns every state container and background task so nothing lives in a
//! global: front-ends construct one context at startup, hand out
//! subscriptions to whatever renders, and shut it down on exit.

use std::sync::Arc;

use pulse_core::auth::{AuthState, Session};
use pulse_core::backend::DashboardBackend;
use pulse_core::config::EngineConfig;
use pulse_core::prefs::{DashboardPreferences, PreferenceState};
use pulse_core::storage::SnapshotStore;

use crate::live::LiveTicker;
use crate::persistence::{AUTH_SNAPSHOT, AutosaveHandle, PREFS_SNAPSHOT, restore, spawn_autosave};
use crate::refresh::RefreshController;

/// The wired-up engine: containers, controller, ticker, autosave.
///
/// Construction order matters only in that the containers must exist
/// before the controller subscribes to them; teardown cancels tasks
/// before the containers go away.
pub struct AppContext {
    auth: Arc<AuthState>,
    prefs: Arc<PreferenceState>,
    refresh: RefreshController,
    live: LiveTicker,
    autosave: Vec<AutosaveHandle>,
}

impl AppContext {
    /// Restores persisted snapshots, wires the containers to the
    /// backend and spawns the background tasks.
    pub async fn bootstrap(
        backend: Arc<dyn DashboardBackend>,
        store: Arc<dyn SnapshotStore>,
        config: &EngineConfig,
    ) -> Self {
        let session = restore::<Session>(store.as_ref(), AUTH_SNAPSHOT)
            .await
            .unwrap_or_default();
        let auth = Arc::new(AuthState::with_initial(backend.clone(), session));

        let preferences = restore::<DashboardPreferences>(store.as_ref(), PREFS_SNAPSHOT)
            .await
            .unwrap_or_default();
        let prefs = Arc::new(PreferenceState::with_initial(preferences));

        let autosave = vec![
            spawn_autosave(auth.subscribe(), store.clone(), AUTH_SNAPSHOT),
            spawn_autosave(prefs.subscribe(), store.clone(), PREFS_SNAPSHOT),
        ];

        let refresh = RefreshController::spawn(backend, prefs.subscribe());
        let live = LiveTicker::spawn(refresh.state_sender(), config.live_tick_interval());

        tracing::info!("application context ready");
        Self {
            auth,
            prefs,
            refresh,
            live,
            autosave,
        }
    }

    /// The auth state container.
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// The dashboard preference container.
    pub fn prefs(&self) -> &PreferenceState {
        &self.prefs
    }

    /// The data refresh controller.
    pub fn refresh(&self) -> &RefreshController {
        &self.refresh
    }

    /// Cancels the live ticker, the refresh driver and the autosave
    /// tasks, waiting where a task could otherwise still be mid-write.
    pub async fn shutdown(self) {
        self.live.shutdown().await;
        self.refresh.shutdown().await;
        for handle in &self.autosave {
            handle.stop();
        }
        tracing::info!("application context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::metrics::DateRange;
    use pulse_infrastructure::{MemorySnapshotStore, MockBackend};
    use serde_json::json;

    fn backend() -> Arc<dyn DashboardBackend> {
        Arc::new(MockBackend::new().without_latency().with_failure_rate(0.0))
    }

    #[tokio::test]
    async fn test_bootstrap_with_empty_store_uses_defaults() {
        let store = Arc::new(MemorySnapshotStore::new());
        let context = AppContext::bootstrap(backend(), store, &EngineConfig::default()).await;

        assert!(!context.auth().current().authenticated);
        assert_eq!(context.prefs().current().date_range, DateRange::Month);
        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_bootstrap_restores_persisted_preferences() {
        let store = Arc::new(MemorySnapshotStore::new());
        let mut prefs = DashboardPreferences::default();
        prefs.date_range = DateRange::Year;
        store
            .seed(PREFS_SNAPSHOT, serde_json::to_value(&prefs).unwrap())
            .await;

        let context = AppContext::bootstrap(backend(), store, &EngineConfig::default()).await;
        assert_eq!(context.prefs().current().date_range, DateRange::Year);
        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_bootstrap_survives_corrupt_snapshots() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.seed(AUTH_SNAPSHOT, json!([1, 2, 3])).await;
        store.seed(PREFS_SNAPSHOT, json!("garbage")).await;

        let context = AppContext::bootstrap(backend(), store, &EngineConfig::default()).await;
        assert!(!context.auth().current().authenticated);
        assert_eq!(
            context.prefs().current(),
            DashboardPreferences::default()
        );
        context.shutdown().await;
    }
}
