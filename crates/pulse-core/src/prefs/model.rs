//! Dashboard preference document.
//!
//! This is the state that persists across restarts: the selected date
//! range, the active section, and the per-section chart type and
//! visibility choices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::{ChartType, DateRange, Section};

/// User-adjustable dashboard preferences.
///
/// Invariant: `chart_types` and `visible_sections` always contain exactly
/// the three section keys. The setters preserve it; [`normalized`] repairs
/// documents rehydrated from storage that are missing entries.
///
/// [`normalized`]: DashboardPreferences::normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardPreferences {
    /// The reporting window charts cover.
    pub date_range: DateRange,
    /// The section currently in focus.
    pub active_section: Section,
    /// Chart style per section.
    pub chart_types: BTreeMap<Section, ChartType>,
    /// Which sections are shown at all.
    pub visible_sections: BTreeMap<Section, bool>,
}

impl Default for DashboardPreferences {
    fn default() -> Self {
        Self {
            date_range: DateRange::Month,
            active_section: Section::Sales,
            chart_types: Section::ALL
                .into_iter()
                .map(|section| (section, Self::default_chart_type(section)))
                .collect(),
            visible_sections: Section::ALL
                .into_iter()
                .map(|section| (section, true))
                .collect(),
        }
    }
}

impl DashboardPreferences {
    /// The out-of-the-box chart style for a section.
    pub fn default_chart_type(section: Section) -> ChartType {
        match section {
            Section::Sales => ChartType::Bar,
            Section::Users => ChartType::Line,
            Section::Traffic => ChartType::Area,
        }
    }

    /// Re-establishes the map invariant on a rehydrated document.
    ///
    /// Snapshots that were hand-edited or written by an older build may
    /// parse cleanly while missing section entries; missing keys get
    /// their defaults, present keys are kept as-is.
    pub fn normalized(mut self) -> Self {
        for section in Section::ALL {
            self.chart_types
                .entry(section)
                .or_insert_with(|| Self::default_chart_type(section));
            self.visible_sections.entry(section).or_insert(true);
        }
        self
    }

    /// True if the section's metrics are currently shown.
    pub fn is_visible(&self, section: Section) -> bool {
        self.visible_sections.get(&section).copied().unwrap_or(true)
    }

    /// The chart style for a section.
    pub fn chart_type(&self, section: Section) -> ChartType {
        self.chart_types
            .get(&section)
            .copied()
            .unwrap_or_else(|| Self::default_chart_type(section))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = DashboardPreferences::default();
        assert_eq!(prefs.date_range, DateRange::Month);
        assert_eq!(prefs.active_section, Section::Sales);
        assert_eq!(prefs.chart_type(Section::Sales), ChartType::Bar);
        assert_eq!(prefs.chart_type(Section::Users), ChartType::Line);
        assert_eq!(prefs.chart_type(Section::Traffic), ChartType::Area);
        assert!(Section::ALL.iter().all(|&s| prefs.is_visible(s)));
    }

    #[test]
    fn test_default_maps_hold_exactly_three_keys() {
        let prefs = DashboardPreferences::default();
        assert_eq!(prefs.chart_types.len(), 3);
        assert_eq!(prefs.visible_sections.len(), 3);
    }

    #[test]
    fn test_normalized_fills_missing_entries() {
        let mut prefs = DashboardPreferences::default();
        prefs.chart_types.remove(&Section::Users);
        prefs.visible_sections.remove(&Section::Traffic);

        let repaired = prefs.normalized();
        assert_eq!(repaired.chart_type(Section::Users), ChartType::Line);
        assert!(repaired.is_visible(Section::Traffic));
        assert_eq!(repaired.chart_types.len(), 3);
        assert_eq!(repaired.visible_sections.len(), 3);
    }

    #[test]
    fn test_partial_snapshot_deserializes_with_defaults() {
        // Only one field present; everything else defaults.
        let prefs: DashboardPreferences =
            serde_json::from_value(serde_json::json!({ "dateRange": "week" })).unwrap();
        let prefs = prefs.normalized();
        assert_eq!(prefs.date_range, DateRange::Week);
        assert_eq!(prefs.active_section, Section::Sales);
        assert_eq!(prefs.chart_types.len(), 3);
    }
}
