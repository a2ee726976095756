//! Turns raw selector labels into a [`FilterSelection`].

use tracing::warn;

use crate::{
    error::AppError,
    models::filter::{FilterSelection, Region, TimeRange, ALL_REGIONS},
};

/// Unknown or missing labels fall back to the 30 minute window.
pub fn resolve_time_range(label: Option<&str>) -> TimeRange {
    match label {
        None => TimeRange::default(),
        Some(label) => label.parse().unwrap_or_else(|_| {
            warn!(label, "unrecognized time range, falling back to 30 mins");
            TimeRange::default()
        }),
    }
}

/// `All` (or nothing) means no constraint; unknown regions are rejected.
pub fn resolve_region(label: Option<&str>) -> Result<Option<Region>, AppError> {
    let label = match label.map(str::trim) {
        None => return Ok(None),
        Some(label) if label == ALL_REGIONS => return Ok(None),
        Some(label) => label,
    };
    Region::ALL
        .into_iter()
        .find(|region| region.as_str() == label)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("unknown region '{label}'")))
}

pub fn resolve(
    time_range: Option<&str>,
    region: Option<&str>,
) -> Result<FilterSelection, AppError> {
    Ok(FilterSelection::new(
        resolve_time_range(time_range),
        resolve_region(region)?,
    ))
}
