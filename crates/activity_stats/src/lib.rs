//! Activity history statistics: CSV rows in, a serializable report model out.
//!
//! The pipeline is strictly one way:
//! raw rows -> [`Activity`] records ([`ingest`]) -> derived statistics
//! ([`aggregate`]) -> [`model::ReportModel`] ([`model`]).

use chrono::NaiveDateTime;
use thiserror::Error;

pub mod aggregate;
pub mod config;
pub mod ingest;
pub mod model;
pub mod utils;

pub use aggregate::{Aggregates, aggregate};
pub use config::{AnalysisConfig, ColumnMap, DistanceUnit, YearScope};
pub use ingest::{Ingested, RawRow, RowParseError, ingest_rows, read_csv_rows};
pub use model::{ReportModel, build_report};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("no valid activities found ({skipped} malformed rows skipped)")]
    EmptyDataset { skipped: usize },
}

/// One normalized activity. Distances are kilometers, durations seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub date: NaiveDateTime,
    pub activity_type: String,
    pub title: Option<String>,
    pub distance_km: f64,
    pub duration_secs: f64,
    pub avg_hr: Option<u32>,
    pub max_hr: Option<u32>,
    pub avg_cadence: Option<u32>,
    pub max_cadence: Option<u32>,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: Option<f64>,
    pub calories: Option<u32>,
    pub avg_pace: Option<String>,
    pub best_pace: Option<String>,
}

impl Activity {
    /// Minimal activity with every optional field absent.
    pub fn new(date: NaiveDateTime, distance_km: f64, duration_secs: f64) -> Self {
        Self {
            date,
            activity_type: "Unknown".to_string(),
            title: None,
            distance_km,
            duration_secs,
            avg_hr: None,
            max_hr: None,
            avg_cadence: None,
            max_cadence: None,
            elevation_gain_m: 0.0,
            elevation_loss_m: None,
            calories: None,
            avg_pace: None,
            best_pace: None,
        }
    }

    pub fn with_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    pub fn with_hr(mut self, avg_hr: u32) -> Self {
        self.avg_hr = Some(avg_hr);
        self
    }

    pub fn with_cadence(mut self, avg_cadence: u32) -> Self {
        self.avg_cadence = Some(avg_cadence);
        self
    }

    pub fn with_elevation(mut self, gain_m: f64) -> Self {
        self.elevation_gain_m = gain_m;
        self
    }

    /// Seconds per kilometer, or `None` when either distance or duration is zero.
    pub fn pace_secs_per_km(&self) -> Option<f64> {
        (self.duration_secs > 0.0 && self.distance_km > 0.0)
            .then(|| self.duration_secs / self.distance_km)
    }

    /// Case-insensitive substring match on the activity type. `None` matches everything.
    pub fn matches_sport(&self, filter: Option<&str>) -> bool {
        match filter {
            None => true,
            Some(f) => self
                .activity_type
                .to_lowercase()
                .contains(&f.to_lowercase()),
        }
    }
}

/// Validate, ingest, aggregate and shape rows that were already read.
pub fn generate_report(
    rows: Vec<RawRow>,
    config: &AnalysisConfig,
    generated_at: NaiveDateTime,
) -> Result<ReportModel, StatsError> {
    config.validate()?;
    let ingested = ingest_rows(rows, config)?;
    let aggregates = aggregate(&ingested.activities, config);
    Ok(build_report(&ingested, &aggregates, config, generated_at))
}

/// Same as [`generate_report`] but reads the CSV first. Configuration is
/// validated before any input is touched.
pub fn generate_report_from_csv<R: std::io::Read>(
    reader: R,
    config: &AnalysisConfig,
    generated_at: NaiveDateTime,
) -> Result<ReportModel, StatsError> {
    config.validate()?;
    let rows = read_csv_rows(reader, &config.columns)?;
    generate_report(rows, config, generated_at)
}
