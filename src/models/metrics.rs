use std::collections::BTreeMap;

use serde::Serialize;

/// Headline numbers for the selected window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_trips: usize,
    pub total_revenue: f64,
    pub total_passengers: i64,
    /// Mean of the non-null wait times; `None` when none were recorded.
    pub avg_wait_time: Option<f64>,
    pub avg_trip_duration: Option<f64>,
    pub total_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub trip_count: usize,
    pub revenue: f64,
    /// Undefined when the region has no trips.
    pub revenue_per_trip: Option<f64>,
}

pub type RegionAggregate = BTreeMap<String, RegionStats>;

/// KPIs and region breakdown taken from the same dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub kpis: KpiSummary,
    pub regions: RegionAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MetricsOutcome {
    /// The fetch returned no rows; nothing was aggregated.
    Empty,
    #[serde(rename = "ok")]
    Computed(DashboardMetrics),
}

impl MetricsOutcome {
    pub fn metrics(&self) -> Option<&DashboardMetrics> {
        match self {
            MetricsOutcome::Empty => None,
            MetricsOutcome::Computed(metrics) => Some(metrics),
        }
    }
}
