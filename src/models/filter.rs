use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::AppError;

/// Time-range choices offered by the dashboard selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "30 mins")]
    ThirtyMinutes,
    #[serde(rename = "1 hour")]
    OneHour,
    #[serde(rename = "1 day")]
    OneDay,
    #[serde(rename = "7 days")]
    SevenDays,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::ThirtyMinutes,
        TimeRange::OneHour,
        TimeRange::OneDay,
        TimeRange::SevenDays,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::ThirtyMinutes => "30 mins",
            TimeRange::OneHour => "1 hour",
            TimeRange::OneDay => "1 day",
            TimeRange::SevenDays => "7 days",
        }
    }

    pub fn lookback(self) -> Lookback {
        match self {
            TimeRange::ThirtyMinutes => Lookback::new(LookbackUnit::Minute, 30),
            TimeRange::OneHour => Lookback::new(LookbackUnit::Hour, 1),
            TimeRange::OneDay => Lookback::new(LookbackUnit::Day, 1),
            TimeRange::SevenDays => Lookback::new(LookbackUnit::Day, 7),
        }
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.label() == s.trim())
            .ok_or_else(|| AppError::BadRequest(format!("unknown time range '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookbackUnit {
    Minute,
    Hour,
    Day,
}

/// A window ending now: `magnitude` units before the warehouse clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lookback {
    pub unit: LookbackUnit,
    pub magnitude: u32,
}

impl Lookback {
    pub fn new(unit: LookbackUnit, magnitude: u32) -> Self {
        Self { unit, magnitude }
    }

    /// SQLite date modifier moving `now` back to the start of the window.
    pub fn sqlite_modifier(&self) -> String {
        let unit = match self.unit {
            LookbackUnit::Minute => "minutes",
            LookbackUnit::Hour => "hours",
            LookbackUnit::Day => "days",
        };
        format!("-{} {unit}", self.magnitude)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            LookbackUnit::Minute => "minute",
            LookbackUnit::Hour => "hour",
            LookbackUnit::Day => "day",
        };
        let plural = if self.magnitude == 1 { "" } else { "s" };
        write!(f, "{} {unit}{plural}", self.magnitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::South,
        Region::East,
        Region::West,
        Region::Central,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label of the region option that applies no constraint.
pub const ALL_REGIONS: &str = "All";

/// The two selector values for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub time_range: TimeRange,
    /// `None` means every region.
    pub region: Option<Region>,
}

impl FilterSelection {
    pub fn new(time_range: TimeRange, region: Option<Region>) -> Self {
        Self { time_range, region }
    }

    pub fn lookback(&self) -> Lookback {
        self.time_range.lookback()
    }

    pub fn region_label(&self) -> &'static str {
        self.region.map(Region::as_str).unwrap_or(ALL_REGIONS)
    }
}
