//! Live update simulator.
//!
//! Emulates a streaming feed without touching the network: on a fixed
//! period it overwrites the `sales`, `users` and `page_views` of the
//! newest data point in place. `date`, `active_users`, `new_signups`,
//! the series length and the loading/error fields are never touched.
//!
//! The timer only runs while there is data to animate: the task parks
//! until the series is non-empty and goes back to parking when it
//! empties again, so an idle dashboard has no timer firing at all.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

use pulse_core::refresh::RefreshState;

/// Default period between live ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(5);

/// Cancellation handle for a running live ticker.
///
/// [`shutdown`](LiveTicker::shutdown) stops the task deterministically;
/// dropping the handle aborts it.
pub struct LiveTicker {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveTicker {
    /// Spawns the ticker over the given refresh state.
    ///
    /// The ticker holds only a mutation capability over the state; it
    /// never replaces the series or transitions the state machine.
    pub fn spawn(state: Arc<watch::Sender<RefreshState>>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(state, period, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancels the ticker and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LiveTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn run(state: Arc<watch::Sender<RefreshState>>, period: Duration, cancel: CancellationToken) {
    let mut rx = state.subscribe();
    loop {
        // Park until there is a series to animate.
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("live ticker stopped");
                return;
            }
            parked = rx.wait_for(|s| !s.data.is_empty()) => {
                if parked.is_err() {
                    tracing::debug!("refresh state dropped, live ticker stopping");
                    return;
                }
            }
        }

        // First tick lands one full period after data arrived.
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("live ticker stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if !tick_once(&state) {
                        // Series emptied; stop the timer and park again.
                        break;
                    }
                }
            }
        }
    }
}

/// Overwrites the live fields of the newest point. Returns false when
/// there was no point to mutate.
fn tick_once(state: &watch::Sender<RefreshState>) -> bool {
    let mut updated = false;
    state.send_if_modified(|refresh| match refresh.data.last_mut() {
        Some(last) => {
            let mut rng = rand::thread_rng();
            last.sales = rng.gen_range(0..10_000);
            last.users = rng.gen_range(0..1_000);
            last.page_views = rng.gen_range(0..50_000);
            updated = true;
            true
        }
        None => false,
    });
    if updated {
        tracing::trace!("live tick applied");
    }
    updated
}
