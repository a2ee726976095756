use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::{
        filter::{FilterSelection, Lookback},
        metrics::MetricsOutcome,
        trip::TripDataset,
    },
    services::{metrics, query::TripQuery, warehouse::TripSource},
};

/// Everything one render pass hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub filters: FilterSelection,
    pub lookback: Lookback,
    #[serde(flatten)]
    pub outcome: MetricsOutcome,
    #[serde(skip_serializing_if = "TripDataset::is_empty")]
    pub trips: TripDataset,
}

/// Build, fetch and aggregate for one filter selection.
#[tracing::instrument(skip(source), fields(time_range = selection.time_range.label(), region = selection.region_label()))]
pub async fn render_pass(
    source: &dyn TripSource,
    table: &str,
    selection: FilterSelection,
) -> Result<DashboardReport, AppError> {
    let query = TripQuery::new(table, &selection);
    let trips = source.fetch_trips(&query).await?;
    debug!(rows = trips.len(), "fetched trips");

    let outcome = metrics::summarize(&trips);
    if let MetricsOutcome::Computed(computed) = &outcome {
        info!(
            total_trips = computed.kpis.total_trips,
            regions = computed.regions.len(),
            "dashboard metrics computed"
        );
    } else {
        info!("no trips in the selected window");
    }

    Ok(DashboardReport {
        filters: selection,
        lookback: query.lookback(),
        outcome,
        trips,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::filter::{Region, TimeRange};

    #[derive(Default)]
    struct RecordingSource {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TripSource for RecordingSource {
        async fn fetch_trips(&self, query: &TripQuery) -> Result<TripDataset, AppError> {
            self.seen.lock().unwrap().push(query.sql());
            Ok(TripDataset::default())
        }
    }

    struct DownSource;

    #[async_trait]
    impl TripSource for DownSource {
        async fn fetch_trips(&self, _query: &TripQuery) -> Result<TripDataset, AppError> {
            Err(AppError::Connection("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn empty_fetch_reports_empty_outcome() {
        let source = RecordingSource::default();
        let selection = FilterSelection::new(TimeRange::OneDay, Some(Region::East));

        let report = render_pass(&source, "main.taxi_trips", selection)
            .await
            .unwrap();

        assert_eq!(report.outcome, MetricsOutcome::Empty);
        assert_eq!(report.lookback, TimeRange::OneDay.lookback());
        let seen = source.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("region = ?"));
    }

    #[tokio::test]
    async fn fetch_failures_propagate() {
        let err = render_pass(&DownSource, "main.taxi_trips", FilterSelection::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Connection(_)));
    }

    #[tokio::test]
    async fn empty_report_serializes_with_status() {
        let report = render_pass(
            &RecordingSource::default(),
            "main.taxi_trips",
            FilterSelection::default(),
        )
        .await
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "empty");
        assert_eq!(json["filters"]["time_range"], "30 mins");
        assert_eq!(json["filters"]["region"], serde_json::Value::Null);
    }
}
