//! KPI and per-region rollups over one [`TripDataset`].
//!
//! Null numeric fields are skipped: sums ignore them and means average only
//! the values that are present.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{
    metrics::{DashboardMetrics, KpiSummary, MetricsOutcome, RegionAggregate, RegionStats},
    trip::TripDataset,
};

pub fn summarize(dataset: &TripDataset) -> MetricsOutcome {
    if dataset.is_empty() {
        return MetricsOutcome::Empty;
    }
    MetricsOutcome::Computed(DashboardMetrics {
        kpis: kpi_summary(dataset),
        regions: region_aggregate(dataset),
    })
}

pub fn kpi_summary(dataset: &TripDataset) -> KpiSummary {
    let distinct: HashSet<&str> = dataset.iter().map(|t| t.trip_id.as_str()).collect();

    KpiSummary {
        total_trips: distinct.len(),
        total_revenue: dataset.iter().filter_map(|t| t.fare).sum(),
        total_passengers: dataset.iter().filter_map(|t| t.passenger_count).sum(),
        avg_wait_time: mean(dataset.iter().filter_map(|t| t.passenger_wait_time)),
        avg_trip_duration: mean(dataset.iter().filter_map(|t| t.trip_duration)),
        total_distance: dataset.iter().filter_map(|t| t.trip_distance).sum(),
    }
}

pub fn region_aggregate(dataset: &TripDataset) -> RegionAggregate {
    let mut ids: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    let mut revenue: BTreeMap<String, f64> = BTreeMap::new();

    for trip in dataset {
        ids.entry(trip.region.as_str())
            .or_default()
            .insert(trip.trip_id.as_str());
        *revenue.entry(trip.region.clone()).or_default() += trip.fare.unwrap_or(0.0);
    }

    let counts: BTreeMap<String, usize> = ids
        .into_iter()
        .map(|(region, trips)| (region.to_string(), trips.len()))
        .collect();

    join_by_region(&counts, &revenue)
}

/// Combines independently grouped counts and revenue on the region key.
///
/// A region missing from one side gets zero for that side, and a zero count
/// leaves `revenue_per_trip` undefined.
pub fn join_by_region(
    counts: &BTreeMap<String, usize>,
    revenue: &BTreeMap<String, f64>,
) -> RegionAggregate {
    let regions: BTreeSet<&String> = counts.keys().chain(revenue.keys()).collect();

    regions
        .into_iter()
        .map(|region| {
            let trip_count = counts.get(region).copied().unwrap_or(0);
            let total = revenue.get(region).copied().unwrap_or(0.0);
            let revenue_per_trip = (trip_count > 0).then(|| total / trip_count as f64);
            (
                region.clone(),
                RegionStats {
                    trip_count,
                    revenue: total,
                    revenue_per_trip,
                },
            )
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
