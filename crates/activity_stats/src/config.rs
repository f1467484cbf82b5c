use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::StatsError;

pub const DEFAULT_MAX_HR: u32 = 182;
pub const DEFAULT_REST_HR: u32 = 50;
pub const DEFAULT_ZONE_FLOOR: f64 = 0.0;
pub const DEFAULT_CADENCE_BIN_WIDTH: u32 = 5;
pub const DEFAULT_TOP_N: usize = 5;

pub const KM_PER_MILE: f64 = 1.609_344;

/// Highest cadence (steps or revolutions per minute) accepted from an export.
pub const MAX_CADENCE_SPM: u32 = 300;
/// With a raised zone floor, average HR at or below this is treated as a
/// sensor glitch and left out of the zones.
pub const MIN_ZONED_HR: u32 = 40;

/// How the monthly and cumulative distance series treat multi-year data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum YearScope {
    /// Every observed month; the cumulative total never resets.
    #[default]
    AllYears,
    /// Every observed month; the cumulative total resets each 1 January.
    PerYear,
    /// Only the most recent calendar year present in the data.
    LatestYear,
}

impl YearScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearScope::AllYears => "all",
            YearScope::PerYear => "per-year",
            YearScope::LatestYear => "latest",
        }
    }
}

impl fmt::Display for YearScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YearScope {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-years" => Ok(YearScope::AllYears),
            "per-year" | "ytd" => Ok(YearScope::PerYear),
            "latest" | "latest-year" => Ok(YearScope::LatestYear),
            other => Err(StatsError::Config(format!("unknown year scope '{other}'"))),
        }
    }
}

/// Unit the export uses for the distance column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceUnit {
    /// Kilometers, with the export's meter quirks: `Track Running` rows and
    /// any value above 1000 are meters.
    #[default]
    Kilometers,
    Miles,
    Meters,
}

impl DistanceUnit {
    pub fn to_km(self, value: f64, activity_type: &str) -> f64 {
        match self {
            DistanceUnit::Kilometers => {
                if activity_type == "Track Running" || value > 1000.0 {
                    value / 1000.0
                } else {
                    value
                }
            }
            DistanceUnit::Miles => value * KM_PER_MILE,
            DistanceUnit::Meters => value / 1000.0,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "m" | "meters" => Ok(DistanceUnit::Meters),
            other => Err(StatsError::Config(format!("unknown distance unit '{other}'"))),
        }
    }
}

/// Column names of the activity export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: String,
    pub distance: String,
    pub duration: String,
    pub activity_type: String,
    pub title: String,
    pub avg_hr: String,
    pub max_hr: String,
    pub avg_cadence: String,
    pub max_cadence: String,
    pub elevation_gain: String,
    pub elevation_loss: String,
    pub calories: String,
    pub avg_pace: String,
    pub best_pace: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Date".into(),
            distance: "Distance".into(),
            duration: "Time".into(),
            activity_type: "Activity Type".into(),
            title: "Title".into(),
            avg_hr: "Avg HR".into(),
            max_hr: "Max HR".into(),
            avg_cadence: "Avg Run Cadence".into(),
            max_cadence: "Max Run Cadence".into(),
            elevation_gain: "Total Ascent".into(),
            elevation_loss: "Total Descent".into(),
            calories: "Calories".into(),
            avg_pace: "Avg Pace".into(),
            best_pace: "Best Pace".into(),
        }
    }
}

impl ColumnMap {
    pub fn required(&self) -> [&str; 3] {
        [&self.date, &self.distance, &self.duration]
    }
}

/// Constants injected into the aggregation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    pub max_hr: u32,
    pub rest_hr: u32,
    /// Lower bound of the five equal-width HRR zones; fractions below it land in Z1.
    pub zone_floor: f64,
    pub cadence_bin_width: u32,
    pub top_n: usize,
    pub year_scope: YearScope,
    /// Restricts HR zones, cadence and pace/HR pairs to matching activity types.
    pub sport_filter: Option<String>,
    pub distance_unit: DistanceUnit,
    pub columns: ColumnMap,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_hr: DEFAULT_MAX_HR,
            rest_hr: DEFAULT_REST_HR,
            zone_floor: DEFAULT_ZONE_FLOOR,
            cadence_bin_width: DEFAULT_CADENCE_BIN_WIDTH,
            top_n: DEFAULT_TOP_N,
            year_scope: YearScope::default(),
            sport_filter: None,
            distance_unit: DistanceUnit::default(),
            columns: ColumnMap::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.max_hr <= self.rest_hr {
            return Err(StatsError::Config(format!(
                "max HR ({}) must be greater than resting HR ({})",
                self.max_hr, self.rest_hr
            )));
        }
        if self.cadence_bin_width == 0 {
            return Err(StatsError::Config("cadence bin width must be positive".into()));
        }
        if self.top_n == 0 {
            return Err(StatsError::Config("leaderboard size must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.zone_floor) {
            return Err(StatsError::Config(format!(
                "zone floor must be within [0, 1), got {}",
                self.zone_floor
            )));
        }
        Ok(())
    }

    /// Beats between resting and maximum heart rate.
    pub fn hr_reserve(&self) -> f64 {
        f64::from(self.max_hr) - f64::from(self.rest_hr)
    }
}
