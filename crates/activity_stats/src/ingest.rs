//! Record ingestion: raw string rows to typed [`Activity`] records.
//!
//! Malformed rows are skipped and reported, never fatal. Only an input with
//! no usable row at all aborts the run.

use std::collections::BTreeMap;
use std::io::Read;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, ColumnMap, MAX_CADENCE_SPM};
use crate::utils::{InvalidValue, parse_activity_date, parse_count, parse_duration_secs, parse_number};
use crate::{Activity, StatsError};

/// Column name to cell value.
pub type RawRow = BTreeMap<String, String>;

/// A skipped row. `row` is the 1-based data row number (header excluded).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {reason}")]
pub struct RowParseError {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Ingested {
    pub activities: Vec<Activity>,
    pub skipped: Vec<RowParseError>,
}

#[derive(Debug, Error)]
enum RowIssue {
    #[error("missing date")]
    MissingDate,
    #[error("unparseable date '{0}'")]
    BadDate(String),
    #[error("negative {0}")]
    Negative(&'static str),
    #[error("implausible {field} {value}")]
    Implausible { field: &'static str, value: u32 },
    #[error(transparent)]
    Value(#[from] InvalidValue),
}

/// Read a header-bearing CSV into rows keyed by header name.
///
/// A header lacking one of the required columns is fatal; an input with no
/// header at all is reported as an empty dataset.
pub fn read_csv_rows<R: Read>(reader: R, columns: &ColumnMap) -> Result<Vec<RawRow>, StatsError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| decode_field(h).0.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(StatsError::EmptyDataset { skipped: 0 });
    }
    if let Some(missing) = columns
        .required()
        .into_iter()
        .find(|required| !headers.iter().any(|h| h == required))
    {
        return Err(StatsError::MissingColumn(missing.to_string()));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.byte_records().enumerate() {
        let record = record?;
        let mut replaced = false;
        let row: RawRow = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|field| {
                let (text, lossy) = decode_field(field);
                replaced |= lossy;
                text
            }))
            .collect();
        if replaced {
            warn!(row = idx + 1, "invalid UTF-8 replaced in row");
        }
        rows.push(row);
    }
    debug!(rows = rows.len(), columns = headers.len(), "read csv");
    Ok(rows)
}

/// Decode a CSV field, replacing invalid UTF-8 (e.g. Latin-1 titles) rather
/// than failing the whole file. The flag reports whether anything was replaced.
fn decode_field(field: &[u8]) -> (String, bool) {
    match std::str::from_utf8(field) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (String::from_utf8_lossy(field).into_owned(), true),
    }
}

/// Coerce rows into activities, keeping input order.
pub fn ingest_rows<I>(rows: I, config: &AnalysisConfig) -> Result<Ingested, StatsError>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut activities = Vec::new();
    let mut skipped = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        match parse_row(&row, config) {
            Ok(activity) => activities.push(activity),
            Err(issue) => {
                let err = RowParseError {
                    row: idx + 1,
                    reason: issue.to_string(),
                };
                warn!("skipping {err}");
                skipped.push(err);
            }
        }
    }

    if activities.is_empty() {
        return Err(StatsError::EmptyDataset {
            skipped: skipped.len(),
        });
    }
    info!(
        activities = activities.len(),
        skipped = skipped.len(),
        "ingested activities"
    );
    Ok(Ingested {
        activities,
        skipped,
    })
}

fn parse_row(row: &RawRow, config: &AnalysisConfig) -> Result<Activity, RowIssue> {
    let cols = &config.columns;
    let field = |name: &str| row.get(name).map(|v| v.trim()).unwrap_or("");
    let text = |name: &str| {
        let v = field(name);
        (!v.is_empty() && v != "--").then(|| v.to_string())
    };

    let raw_date = field(&cols.date);
    if raw_date.is_empty() {
        return Err(RowIssue::MissingDate);
    }
    let date = parse_activity_date(raw_date).ok_or_else(|| RowIssue::BadDate(raw_date.into()))?;

    let activity_type = text(&cols.activity_type).unwrap_or_else(|| "Unknown".to_string());

    let raw_distance = parse_number(field(&cols.distance))?.unwrap_or(0.0);
    if raw_distance < 0.0 {
        return Err(RowIssue::Negative("distance"));
    }
    let duration_secs = parse_duration_secs(field(&cols.duration))?.unwrap_or(0.0);
    let elevation_gain_m = parse_number(field(&cols.elevation_gain))?.unwrap_or(0.0);
    if elevation_gain_m < 0.0 {
        return Err(RowIssue::Negative("elevation gain"));
    }

    let avg_cadence = plausible_cadence(parse_count(field(&cols.avg_cadence))?, "average cadence")?;
    let max_cadence = plausible_cadence(parse_count(field(&cols.max_cadence))?, "max cadence")?;

    Ok(Activity {
        date,
        distance_km: config.distance_unit.to_km(raw_distance, &activity_type),
        activity_type,
        title: text(&cols.title),
        duration_secs,
        avg_hr: parse_count(field(&cols.avg_hr))?.filter(|v| *v > 0),
        max_hr: parse_count(field(&cols.max_hr))?.filter(|v| *v > 0),
        avg_cadence,
        max_cadence,
        elevation_gain_m,
        elevation_loss_m: parse_number(field(&cols.elevation_loss))?,
        calories: parse_count(field(&cols.calories))?,
        avg_pace: text(&cols.avg_pace),
        best_pace: text(&cols.best_pace),
    })
}

/// Zero means "not recorded"; anything above [`MAX_CADENCE_SPM`] fails the row.
fn plausible_cadence(value: Option<u32>, field: &'static str) -> Result<Option<u32>, RowIssue> {
    match value {
        Some(v) if v > MAX_CADENCE_SPM => Err(RowIssue::Implausible { field, value: v }),
        other => Ok(other.filter(|v| *v > 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_full_row() {
        let cfg = AnalysisConfig::default();
        let r = row(&[
            ("Activity Type", "Running"),
            ("Date", "2025-04-02 07:15:00"),
            ("Title", "Morning Run"),
            ("Distance", "10.02"),
            ("Calories", "1,021"),
            ("Time", "00:52:10"),
            ("Avg HR", "151"),
            ("Max HR", "170"),
            ("Total Ascent", "84"),
            ("Total Descent", "80"),
            ("Avg Run Cadence", "172"),
            ("Max Run Cadence", "188"),
            ("Avg Pace", "5:12"),
            ("Best Pace", "4:30"),
        ]);
        let a = parse_row(&r, &cfg).unwrap();
        assert_eq!(a.activity_type, "Running");
        assert_eq!(a.title.as_deref(), Some("Morning Run"));
        assert_eq!(a.distance_km, 10.02);
        assert_eq!(a.duration_secs, 3130.0);
        assert_eq!(a.calories, Some(1021));
        assert_eq!(a.avg_hr, Some(151));
        assert_eq!(a.avg_cadence, Some(172));
        assert_eq!(a.elevation_gain_m, 84.0);
        assert_eq!(a.avg_pace.as_deref(), Some("5:12"));
    }

    #[test]
    fn placeholders_map_to_absent_not_zero() {
        let cfg = AnalysisConfig::default();
        let r = row(&[
            ("Date", "2025-04-02 07:15:00"),
            ("Distance", "5"),
            ("Time", "00:30:00"),
            ("Avg HR", "--"),
            ("Avg Run Cadence", "0"),
            ("Total Ascent", "--"),
        ]);
        let a = parse_row(&r, &cfg).unwrap();
        assert_eq!(a.avg_hr, None);
        assert_eq!(a.avg_cadence, None);
        assert_eq!(a.elevation_gain_m, 0.0);
        assert_eq!(a.activity_type, "Unknown");
    }

    #[test]
    fn track_running_is_meters() {
        let cfg = AnalysisConfig::default();
        let r = row(&[
            ("Activity Type", "Track Running"),
            ("Date", "2025-04-02 07:15:00"),
            ("Distance", "800"),
            ("Time", "00:03:00"),
        ]);
        let a = parse_row(&r, &cfg).unwrap();
        assert_eq!(a.distance_km, 0.8);
    }

    #[test]
    fn bad_date_and_negative_distance_fail_row() {
        let cfg = AnalysisConfig::default();
        let bad_date = row(&[("Date", "yesterday"), ("Distance", "5"), ("Time", "10:00")]);
        assert!(matches!(parse_row(&bad_date, &cfg), Err(RowIssue::BadDate(_))));
        let negative = row(&[("Date", "2025-01-01"), ("Distance", "-5"), ("Time", "10:00")]);
        assert!(matches!(parse_row(&negative, &cfg), Err(RowIssue::Negative(_))));
        let missing = row(&[("Distance", "5"), ("Time", "10:00")]);
        assert!(matches!(parse_row(&missing, &cfg), Err(RowIssue::MissingDate)));
    }

    #[test]
    fn implausible_cadence_fails_row() {
        let cfg = AnalysisConfig::default();
        let r = row(&[
            ("Date", "2025-04-02 07:15:00"),
            ("Distance", "5"),
            ("Time", "00:30:00"),
            ("Avg Run Cadence", "4000000000"),
        ]);
        let err = parse_row(&r, &cfg).unwrap_err();
        assert!(matches!(err, RowIssue::Implausible { field: "average cadence", .. }));
        assert_eq!(err.to_string(), "implausible average cadence 4000000000");
    }

    #[test]
    fn ingest_counts_skipped_rows() {
        let cfg = AnalysisConfig::default();
        let rows = vec![
            row(&[("Date", "2025-01-01"), ("Distance", "5"), ("Time", "25:00")]),
            row(&[("Date", "not a date"), ("Distance", "5"), ("Time", "25:00")]),
            row(&[("Date", "2025-01-03"), ("Distance", "x"), ("Time", "25:00")]),
        ];
        let out = ingest_rows(rows, &cfg).unwrap();
        assert_eq!(out.activities.len(), 1);
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(out.skipped[0].row, 2);
        assert_eq!(out.skipped[1].row, 3);
    }

    #[test]
    fn all_malformed_is_empty_dataset() {
        let cfg = AnalysisConfig::default();
        let rows = vec![row(&[("Date", "??"), ("Distance", "5"), ("Time", "1")])];
        let err = ingest_rows(rows, &cfg).unwrap_err();
        assert!(matches!(err, StatsError::EmptyDataset { skipped: 1 }));
    }

    #[test]
    fn read_csv_requires_columns() {
        let csv = "Date,Distance\n2025-01-01,5\n";
        let err = read_csv_rows(csv.as_bytes(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, StatsError::MissingColumn(ref c) if c == "Time"));
    }

    #[test]
    fn read_csv_handles_quoted_thousands() {
        let csv = "Date,Distance,Time,Calories\n2025-01-01 08:00:00,5.0,00:25:00,\"1,200\"\n";
        let rows = read_csv_rows(csv.as_bytes(), &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Calories"], "1,200");
    }

    #[test]
    fn read_csv_replaces_invalid_utf8() {
        let csv: &[u8] = b"Date,Distance,Title,Time\n\
2025-01-01 08:00:00,5.0,Easy,00:25:00\n\
2025-01-02 08:00:00,6.0,Caf\xe9 run,00:30:00\n\
2025-01-03 08:00:00,7.0,Tempo,00:35:00\n";
        let rows = read_csv_rows(csv, &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["Title"], "Caf\u{fffd} run");
        assert_eq!(rows[2]["Distance"], "7.0");

        let out = ingest_rows(rows, &AnalysisConfig::default()).unwrap();
        assert_eq!(out.activities.len(), 3);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn read_csv_empty_input_is_empty_dataset() {
        let err = read_csv_rows("".as_bytes(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, StatsError::EmptyDataset { skipped: 0 }));
    }
}
