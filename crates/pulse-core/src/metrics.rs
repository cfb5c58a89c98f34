//! Metric domain models.
//!
//! Contains the date-range, section and chart-type vocabulary plus the
//! per-period metric snapshot (`DataPoint`) that dashboards consume.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The selectable reporting window for the dashboard.
///
/// Each range maps to a fixed series length: one data point per day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Year,
}

impl DateRange {
    /// Number of data points a series covering this range holds.
    pub fn days(self) -> usize {
        match self {
            DateRange::Week => 7,
            DateRange::Month => 30,
            DateRange::Year => 365,
        }
    }
}

/// One of the three metric domains the dashboard can display.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    #[default]
    Sales,
    Users,
    Traffic,
}

impl Section {
    /// Every section, in display order.
    pub const ALL: [Section; 3] = [Section::Sales, Section::Users, Section::Traffic];
}

/// How a section's chart is drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
}

/// A single per-period metric snapshot.
///
/// `date` is a display label (M/D/YYYY). It is NOT a sortable key:
/// series ordering comes from generation order, never from comparing
/// these strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub date: String,
    pub sales: u64,
    pub users: u64,
    pub page_views: u64,
    pub active_users: u64,
    pub new_signups: u64,
}

/// Ordered list of per-period metric snapshots covering the selected
/// date range, chronological ascending.
pub type Series = Vec<DataPoint>;
