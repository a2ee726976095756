use sqlx::{QueryBuilder, Sqlite};

use crate::models::filter::{FilterSelection, Lookback, Region};

const PROJECTION: &str = "SELECT trip_id, driver_id, passenger_count, trip_distance, \
passenger_wait_time, pickup_time, dropoff_time, region, fare, \
(julianday(dropoff_time) - julianday(pickup_time)) * 1440.0 AS trip_duration";

/// Projection query for the trips inside one lookback window.
#[derive(Debug, Clone)]
pub struct TripQuery {
    table: String,
    lookback: Lookback,
    region: Option<Region>,
}

impl TripQuery {
    /// `table` must already be a validated identifier (see `WarehouseConfig`).
    pub fn new(table: impl Into<String>, selection: &FilterSelection) -> Self {
        Self {
            table: table.into(),
            lookback: selection.lookback(),
            region: selection.region,
        }
    }

    pub fn lookback(&self) -> Lookback {
        self.lookback
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// Filter values are pushed as bind parameters, never into the text.
    pub fn builder(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(PROJECTION);
        qb.push(" FROM ");
        qb.push(&self.table);
        qb.push(" WHERE julianday(pickup_time) >= julianday('now', ");
        qb.push_bind(self.lookback.sqlite_modifier());
        qb.push(")");
        if let Some(region) = self.region {
            qb.push(" AND region = ");
            qb.push_bind(region.as_str().to_string());
        }
        qb
    }

    pub fn sql(&self) -> String {
        self.builder().sql().to_string()
    }
}
