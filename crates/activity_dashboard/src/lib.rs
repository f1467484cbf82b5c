//! Command-line front end: reads an activity export, writes the HTML dashboard
//! and optionally the report model as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use activity_stats::{ReportModel, generate_report_from_csv};
use chrono::NaiveDateTime;
use tracing::{debug, info};

pub mod cli;
pub mod error;
pub mod render;

pub use cli::Args;
pub use error::{DashboardError, DashboardResult};
pub use render::render_html;

pub const LOG_LEVEL_ENV: &str = "ACTIVITY_DASHBOARD_LOG_LEVEL";
const DEFAULT_LOG_FILTER: &str = "info";

/// Pick the log filter: `--verbose` forces debug, then
/// `ACTIVITY_DASHBOARD_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_filter_with<F>(verbose: bool, mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    if verbose {
        return "debug".to_string();
    }
    let set = |v: &String| !v.trim().is_empty();
    get(LOG_LEVEL_ENV)
        .filter(set)
        .or_else(|| get("RUST_LOG").filter(set))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

pub fn log_filter(verbose: bool) -> String {
    log_filter_with(verbose, |key| std::env::var(key).ok())
}

/// An unparseable filter falls back to `info` rather than aborting.
pub fn env_filter(filter: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub html_path: PathBuf,
    pub json_path: Option<PathBuf>,
    pub activities: usize,
    pub skipped_rows: usize,
}

/// Build the report for `csv_path` and write the outputs named in `args`.
pub fn run(
    csv_path: &Path,
    args: &Args,
    generated_at: NaiveDateTime,
) -> DashboardResult<RunSummary> {
    let config = args.analysis_config();
    let file = File::open(csv_path).map_err(|source| DashboardError::Read {
        path: csv_path.to_path_buf(),
        source,
    })?;
    debug!(path = %csv_path.display(), "reading activity export");

    let report = generate_report_from_csv(BufReader::new(file), &config, generated_at)?;
    write_html(&report, &args.output)?;
    if let Some(json_path) = &args.json {
        write_json(&report, json_path)?;
    }

    info!(
        activities = report.summary.total_activities,
        skipped = report.summary.skipped_rows,
        output = %args.output.display(),
        "dashboard written"
    );
    Ok(RunSummary {
        html_path: args.output.clone(),
        json_path: args.json.clone(),
        activities: report.summary.total_activities,
        skipped_rows: report.summary.skipped_rows,
    })
}

pub fn write_html(report: &ReportModel, path: &Path) -> DashboardResult<()> {
    let html = render_html(report)?;
    write_file(path, html.as_bytes())
}

pub fn write_json(report: &ReportModel, path: &Path) -> DashboardResult<()> {
    let json = serde_json::to_vec_pretty(report)?;
    write_file(path, &json)?;
    debug!(path = %path.display(), "report model written");
    Ok(())
}

/// JSON schema of [`ReportModel`], pretty printed.
pub fn report_schema() -> DashboardResult<String> {
    let schema = schemars::schema_for!(ReportModel);
    Ok(serde_json::to_string_pretty(&schema)?)
}

fn write_file(path: &Path, contents: &[u8]) -> DashboardResult<()> {
    std::fs::write(path, contents).map_err(|source| DashboardError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn dashboard_level_wins_over_rust_log() {
        let vars = env(&[(LOG_LEVEL_ENV, "warn"), ("RUST_LOG", "trace")]);
        assert_eq!(log_filter_with(false, |k| vars.get(k).cloned()), "warn");
    }

    #[test]
    fn falls_back_to_rust_log_then_info() {
        let vars = env(&[("RUST_LOG", "trace")]);
        assert_eq!(log_filter_with(false, |k| vars.get(k).cloned()), "trace");
        let empty = env(&[]);
        assert_eq!(log_filter_with(false, |k| empty.get(k).cloned()), "info");
    }

    #[test]
    fn verbose_forces_debug() {
        let vars = env(&[(LOG_LEVEL_ENV, "error")]);
        assert_eq!(log_filter_with(true, |k| vars.get(k).cloned()), "debug");
    }

    #[test]
    fn schema_describes_report_model() {
        let schema = report_schema().unwrap();
        let v: serde_json::Value = serde_json::from_str(&schema).unwrap();
        assert!(v["properties"]["summary"].is_object());
        assert!(v["properties"]["activities"].is_object());
    }
}
