//! Refresh state model.
//!
//! The data-refresh controller in the application layer drives this
//! state machine; the model itself only encodes the transitions so the
//! tri-state invariant lives in one place.

use serde::{Deserialize, Serialize};

use crate::metrics::Series;

/// The state of the series currently backing the dashboard.
///
/// Exactly one of three shapes holds at any time:
///
/// - loading: `loading = true`, `error = None`
/// - errored: `loading = false`, `error = Some`
/// - loaded/idle: `loading = false`, `error = None`
///
/// `data` is retained across both reloads and failures so consumers may
/// keep showing last-known-good values next to a spinner or an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefreshState {
    pub data: Series,
    pub loading: bool,
    pub error: Option<String>,
}

impl RefreshState {
    /// Enters the loading state. Prior data is retained.
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Applies a successful fetch result.
    pub fn complete(&mut self, series: Series) {
        self.data = series;
        self.loading = false;
        self.error = None;
    }

    /// Applies a failed fetch. Prior data is retained unchanged.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    /// True once a fetch has succeeded and nothing newer is pending.
    pub fn is_loaded(&self) -> bool {
        !self.loading && self.error.is_none() && !self.data.is_empty()
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }
}
