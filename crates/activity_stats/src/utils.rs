//! Value parsing and display helpers for export fields.
//!
//! Absent values (empty cell or the export's `--` placeholder) parse to
//! `Ok(None)`; text that is present but unreadable is an [`InvalidValue`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {kind} '{value}'")]
pub struct InvalidValue {
    pub kind: &'static str,
    pub value: String,
}

impl InvalidValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

fn is_absent(s: &str) -> bool {
    s.is_empty() || s == "--"
}

/// Parse an activity timestamp.
///
/// Accepts:
/// - `YYYY-MM-DD HH:MM:SS` (export format)
/// - `YYYY-MM-DDTHH:MM:SS`
/// - RFC3339 datetime (local wall clock is kept)
/// - `YYYY-MM-DD` (midnight)
pub fn parse_activity_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt);
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a decimal number, ignoring thousands separators and stray quotes.
pub fn parse_number(s: &str) -> Result<Option<f64>, InvalidValue> {
    let trimmed = s.trim();
    if is_absent(trimmed) {
        return Ok(None);
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '"').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(InvalidValue::new("number", trimmed)),
    }
}

/// Parse a non-negative whole count; fractional parts are truncated.
pub fn parse_count(s: &str) -> Result<Option<u32>, InvalidValue> {
    match parse_number(s)? {
        None => Ok(None),
        Some(v) if v < 0.0 || v > f64::from(u32::MAX) => Err(InvalidValue::new("count", s.trim())),
        Some(v) => Ok(Some(v.trunc() as u32)),
    }
}

/// Parse a duration into seconds.
///
/// Accepts `HH:MM:SS`, `MM:SS` (either may carry fractional seconds) and a
/// plain number of seconds.
pub fn parse_duration_secs(s: &str) -> Result<Option<f64>, InvalidValue> {
    let trimmed = s.trim();
    if is_absent(trimmed) {
        return Ok(None);
    }
    let parts = trimmed
        .split(':')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| InvalidValue::new("duration", trimmed))?;
    if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(InvalidValue::new("duration", trimmed));
    }
    let secs = match parts.as_slice() {
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        [m, s] => m * 60.0 + s,
        [s] => *s,
        _ => return Err(InvalidValue::new("duration", trimmed)),
    };
    Ok(Some(secs))
}

/// `H:MM:SS`, hours unbounded.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// `M:SS` per kilometer.
pub fn format_pace(secs_per_km: f64) -> String {
    let total = secs_per_km.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
