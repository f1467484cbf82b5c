use std::path::PathBuf;

use activity_stats::config::{
    DEFAULT_CADENCE_BIN_WIDTH, DEFAULT_MAX_HR, DEFAULT_REST_HR, DEFAULT_TOP_N, DEFAULT_ZONE_FLOOR,
};
use activity_stats::{AnalysisConfig, DistanceUnit, YearScope};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "activity-dashboard",
    version,
    about = "Render an activity CSV export as a self-contained HTML dashboard"
)]
pub struct Args {
    /// Activity export (CSV with a header row)
    #[arg(required_unless_present = "schema")]
    pub csv_file: Option<PathBuf>,

    /// Where to write the HTML dashboard
    #[arg(short, long, default_value = "report.html")]
    pub output: PathBuf,

    /// Also write the report model as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Print the report model JSON schema and exit
    #[arg(long)]
    pub schema: bool,

    /// Maximum heart rate used for HR reserve zones
    #[arg(long, default_value_t = DEFAULT_MAX_HR)]
    pub max_hr: u32,

    /// Resting heart rate used for HR reserve zones
    #[arg(long, default_value_t = DEFAULT_REST_HR)]
    pub rest_hr: u32,

    /// HR reserve fraction where Z1 starts; lower values count as Z1 unless at or below 40 bpm
    #[arg(long, default_value_t = DEFAULT_ZONE_FLOOR)]
    pub zone_floor: f64,

    /// Cadence histogram bin width in steps per minute
    #[arg(long = "cadence-bin", default_value_t = DEFAULT_CADENCE_BIN_WIDTH)]
    pub cadence_bin: u32,

    /// Leaderboard size
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Monthly/cumulative scope: all (running total never resets), per-year or latest
    #[arg(long, default_value = "all")]
    pub year_scope: YearScope,

    /// Only use matching activity types for HR zones, cadence and pace/HR (e.g. Running)
    #[arg(long)]
    pub sport_filter: Option<String>,

    /// Unit of the distance column: km, mi or m
    #[arg(long, default_value = "km")]
    pub distance_unit: DistanceUnit,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_hr: self.max_hr,
            rest_hr: self.rest_hr,
            zone_floor: self.zone_floor,
            cadence_bin_width: self.cadence_bin,
            top_n: self.top_n,
            year_scope: self.year_scope,
            sport_filter: self.sport_filter.clone().filter(|s| !s.trim().is_empty()),
            distance_unit: self.distance_unit,
            ..AnalysisConfig::default()
        }
    }
}
