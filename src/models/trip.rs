use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the trips table, with `trip_duration` derived by the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TripRecord {
    pub trip_id: String,
    pub driver_id: String,
    pub passenger_count: Option<i64>,
    /// Kilometres.
    pub trip_distance: Option<f64>,
    /// Minutes.
    pub passenger_wait_time: Option<f64>,
    pub pickup_time: DateTime<Utc>,
    pub dropoff_time: Option<DateTime<Utc>>,
    pub region: String,
    pub fare: Option<f64>,
    /// Minutes between pickup and dropoff; `None` while the trip is open.
    pub trip_duration: Option<f64>,
}

/// The rows returned by a single fetch, in warehouse order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TripDataset(Vec<TripRecord>);

impl TripDataset {
    pub fn new(records: Vec<TripRecord>) -> Self {
        Self(records)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.0.iter()
    }
}

impl From<Vec<TripRecord>> for TripDataset {
    fn from(records: Vec<TripRecord>) -> Self {
        Self(records)
    }
}

impl<'a> IntoIterator for &'a TripDataset {
    type Item = &'a TripRecord;
    type IntoIter = std::slice::Iter<'a, TripRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
