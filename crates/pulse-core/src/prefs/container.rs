//! Observable dashboard preference container.

use tokio::sync::watch;

use crate::metrics::{ChartType, DateRange, Section};
use crate::prefs::model::DashboardPreferences;

/// The dashboard preference state container.
///
/// Single writer over a `tokio::sync::watch` channel; observers subscribe
/// for read-only receivers. Every setter is a synchronous, atomic
/// replacement of one field or one map entry and never fails.
pub struct PreferenceState {
    state: watch::Sender<DashboardPreferences>,
}

impl Default for PreferenceState {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceState {
    /// Creates a container holding the default preferences.
    pub fn new() -> Self {
        Self::with_initial(DashboardPreferences::default())
    }

    /// Creates a container from a rehydrated preference document.
    ///
    /// The document is normalized so the per-section maps always carry
    /// all three section keys.
    pub fn with_initial(initial: DashboardPreferences) -> Self {
        let (state, _) = watch::channel(initial.normalized());
        Self { state }
    }

    /// Returns a read-only observer of the preferences.
    pub fn subscribe(&self) -> watch::Receiver<DashboardPreferences> {
        self.state.subscribe()
    }

    /// Returns a clone of the current preferences.
    pub fn current(&self) -> DashboardPreferences {
        self.state.borrow().clone()
    }

    /// Replaces the selected date range.
    pub fn set_date_range(&self, range: DateRange) {
        self.state.send_modify(|prefs| prefs.date_range = range);
    }

    /// Replaces the active section.
    pub fn set_active_section(&self, section: Section) {
        self.state.send_modify(|prefs| prefs.active_section = section);
    }

    /// Replaces the chart type for exactly one section.
    pub fn set_chart_type(&self, section: Section, chart: ChartType) {
        self.state
            .send_modify(|prefs| {
                prefs.chart_types.insert(section, chart);
            });
    }

    /// Flips the visibility flag for exactly one section.
    pub fn toggle_visibility(&self, section: Section) {
        self.state.send_modify(|prefs| {
            let visible = prefs.visible_sections.entry(section).or_insert(true);
            *visible = !*visible;
        });
    }
}
