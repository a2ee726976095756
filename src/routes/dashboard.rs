use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use tracing::warn;

use crate::{
    error::AppError,
    models::{
        filter::{FilterSelection, Region, TimeRange, ALL_REGIONS},
        metrics::{DashboardMetrics, MetricsOutcome, RegionAggregate, RegionStats},
        trip::{TripDataset, TripRecord},
    },
    services::{
        dashboard::{render_pass, DashboardReport},
        filters,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/dashboard", get(dashboard_json))
}

/// Selector values as submitted by the filter form.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    time_range: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    region: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    show_raw: Option<String>,
}

impl DashboardParams {
    fn show_raw(&self) -> bool {
        self.show_raw
            .as_deref()
            .map(|v| matches!(v, "on" | "true" | "1"))
            .unwrap_or(false)
    }

    fn selection(&self) -> Result<FilterSelection, AppError> {
        filters::resolve(self.time_range.as_deref(), self.region.as_deref())
    }
}

struct SelectOption {
    label: &'static str,
    selected: bool,
}

struct KpiTile {
    label: &'static str,
    value: String,
}

struct ChartBar {
    label: String,
    value: String,
    width: String,
}

struct TripRow {
    trip_id: String,
    driver_id: String,
    region: String,
    pickup_time: String,
    dropoff_time: String,
    passenger_count: String,
    trip_distance: String,
    passenger_wait_time: String,
    trip_duration: String,
    fare: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    time_options: Vec<SelectOption>,
    region_options: Vec<SelectOption>,
    window: String,
    show_raw: bool,
    show_error: bool,
    error_message: String,
    has_data: bool,
    kpis: Vec<KpiTile>,
    trips_by_region: Vec<ChartBar>,
    revenue_by_region: Vec<ChartBar>,
    revenue_per_trip: Vec<ChartBar>,
    rows: Vec<TripRow>,
}

impl DashboardTemplate {
    fn blank(selection: &FilterSelection, show_raw: bool) -> Self {
        Self {
            time_options: time_options(selection.time_range),
            region_options: region_options(selection.region),
            window: selection.lookback().to_string(),
            show_raw,
            show_error: false,
            error_message: String::new(),
            has_data: false,
            kpis: Vec::new(),
            trips_by_region: Vec::new(),
            revenue_by_region: Vec::new(),
            revenue_per_trip: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn from_report(report: &DashboardReport, show_raw: bool) -> Self {
        let mut page = Self::blank(&report.filters, show_raw);
        if let MetricsOutcome::Computed(metrics) = &report.outcome {
            page.has_data = true;
            page.kpis = kpi_tiles(metrics);
            page.trips_by_region = share_bars(&metrics.regions, |s| s.trip_count as f64, |v| {
                format!("{v:.0}")
            });
            page.revenue_by_region =
                share_bars(&metrics.regions, |s| s.revenue, |v| format!("{v:.2}"));
            page.revenue_per_trip = per_trip_bars(&metrics.regions);
            if show_raw {
                page.rows = report.trips.iter().map(trip_row).collect();
            }
        }
        page
    }

    fn failed(selection: &FilterSelection, show_raw: bool, err: &AppError) -> Self {
        let mut page = Self::blank(selection, show_raw);
        page.show_error = true;
        page.error_message = err.to_string();
        page
    }
}

async fn dashboard_page(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let show_raw = params.show_raw();
    let selection = match params.selection() {
        Ok(selection) => selection,
        Err(err) => {
            let fallback = FilterSelection::new(
                filters::resolve_time_range(params.time_range.as_deref()),
                None,
            );
            return render_failure(&fallback, show_raw, err);
        }
    };

    match render_pass(state.warehouse.as_ref(), &state.trips_table(), selection).await {
        Ok(report) => AskamaTemplateResponse::into_response(DashboardTemplate::from_report(
            &report, show_raw,
        )),
        Err(err) => render_failure(&selection, show_raw, err),
    }
}

fn render_failure(selection: &FilterSelection, show_raw: bool, err: AppError) -> Response {
    warn!(error = %err, "dashboard render failed");
    let status: StatusCode = err.status();
    (
        status,
        AskamaTemplateResponse::into_response(DashboardTemplate::failed(
            selection, show_raw, &err,
        )),
    )
        .into_response()
}

async fn dashboard_json(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardReport>, AppError> {
    let selection = params.selection()?;
    let mut report = render_pass(state.warehouse.as_ref(), &state.trips_table(), selection).await?;
    if !params.show_raw() {
        report.trips = TripDataset::default();
    }
    Ok(Json(report))
}

fn time_options(current: TimeRange) -> Vec<SelectOption> {
    TimeRange::ALL
        .into_iter()
        .map(|range| SelectOption {
            label: range.label(),
            selected: range == current,
        })
        .collect()
}

fn region_options(current: Option<Region>) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        label: ALL_REGIONS,
        selected: current.is_none(),
    })
    .chain(Region::ALL.into_iter().map(|region| SelectOption {
        label: region.as_str(),
        selected: current == Some(region),
    }))
    .collect()
}

fn kpi_tiles(metrics: &DashboardMetrics) -> Vec<KpiTile> {
    let kpis = &metrics.kpis;
    vec![
        KpiTile {
            label: "Total Trips",
            value: kpis.total_trips.to_string(),
        },
        KpiTile {
            label: "Total Passengers",
            value: kpis.total_passengers.to_string(),
        },
        KpiTile {
            label: "Total Revenue",
            value: format!("{:.2}", kpis.total_revenue),
        },
        KpiTile {
            label: "Total Trip Distance (km)",
            value: format!("{:.2}", kpis.total_distance),
        },
        KpiTile {
            label: "Avg. Trip Duration (mins)",
            value: optional(kpis.avg_trip_duration),
        },
        KpiTile {
            label: "Avg. Waiting Time (mins)",
            value: optional(kpis.avg_wait_time),
        },
    ]
}

/// Bars sized by each region's share of the total.
fn share_bars<V, F>(regions: &RegionAggregate, value: V, format: F) -> Vec<ChartBar>
where
    V: Fn(&RegionStats) -> f64,
    F: Fn(f64) -> String,
{
    let total: f64 = regions.values().map(&value).sum();
    regions
        .iter()
        .map(|(region, stats)| {
            let v = value(stats);
            let share = if total > 0.0 { v / total * 100.0 } else { 0.0 };
            ChartBar {
                label: region.clone(),
                value: format!("{} ({share:.1}%)", format(v)),
                width: format!("{share:.2}"),
            }
        })
        .collect()
}

/// Bars sized relative to the best-earning region.
fn per_trip_bars(regions: &RegionAggregate) -> Vec<ChartBar> {
    let max = regions
        .values()
        .filter_map(|s| s.revenue_per_trip)
        .fold(0.0_f64, f64::max);
    regions
        .iter()
        .map(|(region, stats)| {
            let width = match stats.revenue_per_trip {
                Some(v) if max > 0.0 => v / max * 100.0,
                _ => 0.0,
            };
            ChartBar {
                label: region.clone(),
                value: optional(stats.revenue_per_trip),
                width: format!("{width:.2}"),
            }
        })
        .collect()
}

fn trip_row(trip: &TripRecord) -> TripRow {
    TripRow {
        trip_id: trip.trip_id.clone(),
        driver_id: trip.driver_id.clone(),
        region: trip.region.clone(),
        pickup_time: trip.pickup_time.format("%Y-%m-%d %H:%M").to_string(),
        dropoff_time: trip
            .dropoff_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "n/a".into()),
        passenger_count: trip
            .passenger_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "n/a".into()),
        trip_distance: optional(trip.trip_distance),
        passenger_wait_time: optional(trip.passenger_wait_time),
        trip_duration: optional(trip.trip_duration),
        fare: optional(trip.fare),
    }
}

fn optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> RegionAggregate {
        RegionAggregate::from([
            (
                "North".to_string(),
                RegionStats {
                    trip_count: 3,
                    revenue: 30.0,
                    revenue_per_trip: Some(10.0),
                },
            ),
            (
                "South".to_string(),
                RegionStats {
                    trip_count: 1,
                    revenue: 5.0,
                    revenue_per_trip: Some(5.0),
                },
            ),
            (
                "West".to_string(),
                RegionStats {
                    trip_count: 0,
                    revenue: 0.0,
                    revenue_per_trip: None,
                },
            ),
        ])
    }

    #[test]
    fn share_bars_split_the_total() {
        let bars = share_bars(&regions(), |s| s.trip_count as f64, |v| format!("{v:.0}"));
        assert_eq!(bars[0].label, "North");
        assert_eq!(bars[0].width, "75.00");
        assert_eq!(bars[0].value, "3 (75.0%)");
        assert_eq!(bars[2].width, "0.00");
    }

    #[test]
    fn per_trip_bars_scale_to_the_best_region() {
        let bars = per_trip_bars(&regions());
        assert_eq!(bars[0].width, "100.00");
        assert_eq!(bars[1].width, "50.00");
        assert_eq!(bars[2].value, "n/a");
    }

    #[test]
    fn region_options_start_with_all() {
        let options = region_options(Some(Region::West));
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].label, "All");
        assert!(!options[0].selected);
        assert!(options.iter().any(|o| o.label == "West" && o.selected));
    }

    #[test]
    fn show_raw_accepts_checkbox_values() {
        let params = DashboardParams {
            show_raw: Some("on".into()),
            ..Default::default()
        };
        assert!(params.show_raw());
        assert!(!DashboardParams::default().show_raw());
    }
}
