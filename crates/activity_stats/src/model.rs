//! Serializable report model handed to the renderer.
//!
//! Field names are the contract with the dashboard template; everything in
//! this module is reshaping only.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregates, ZONE_LABELS};
use crate::config::{AnalysisConfig, YearScope};
use crate::ingest::Ingested;
use crate::utils::{format_duration, format_pace};
use crate::Activity;

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ReportModel {
    pub generated_at: String,
    pub summary: Summary,
    pub monthly: Vec<MonthlyBucket>,
    pub cumulative: Vec<CumulativePoint>,
    pub hr_zones: Vec<HrZoneBucket>,
    pub cadence: Vec<CadenceBucket>,
    pub pace_hr: Vec<PaceHrPoint>,
    pub top_distance: Vec<ActivityRow>,
    pub top_climb: Vec<ActivityRow>,
    pub activity_types: Vec<TypeBreakdown>,
    /// Every ingested activity, most recent first.
    pub activities: Vec<ActivityRow>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Summary {
    pub total_distance_km: f64,
    pub total_duration_secs: f64,
    pub total_duration_display: String,
    pub total_calories: u64,
    pub total_activities: usize,
    pub total_elevation_m: f64,
    pub skipped_rows: usize,
    pub year_scope: YearScope,
    pub scope_year: Option<i32>,
    pub max_hr: u32,
    pub rest_hr: u32,
    pub sport_filter: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    pub distance_km: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CumulativePoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total_km: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct HrZoneBucket {
    /// 1-based zone number.
    pub zone: u8,
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CadenceBucket {
    pub lower_spm: u32,
    pub upper_spm: u32,
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PaceHrPoint {
    pub pace_min_per_km: f64,
    pub avg_hr: u32,
    pub activity_type: String,
    pub title: Option<String>,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TypeBreakdown {
    pub activity_type: String,
    pub count: usize,
    pub distance_km: f64,
    pub duration_secs: f64,
}

/// One table row, display strings precomputed.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityRow {
    pub date: String,
    pub activity_type: String,
    pub title: Option<String>,
    pub distance_km: f64,
    pub duration_secs: f64,
    pub duration_display: String,
    /// Export pace when present, otherwise derived from duration and distance.
    pub pace_display: Option<String>,
    pub avg_hr: Option<u32>,
    pub max_hr: Option<u32>,
    pub avg_cadence: Option<u32>,
    pub elevation_gain_m: f64,
    pub calories: Option<u32>,
}

impl From<&Activity> for ActivityRow {
    fn from(a: &Activity) -> Self {
        Self {
            date: a.date.format("%Y-%m-%d").to_string(),
            activity_type: a.activity_type.clone(),
            title: a.title.clone(),
            distance_km: a.distance_km,
            duration_secs: a.duration_secs,
            duration_display: format_duration(a.duration_secs),
            pace_display: a
                .avg_pace
                .clone()
                .or_else(|| a.pace_secs_per_km().map(format_pace)),
            avg_hr: a.avg_hr,
            max_hr: a.max_hr,
            avg_cadence: a.avg_cadence,
            elevation_gain_m: a.elevation_gain_m,
            calories: a.calories,
        }
    }
}

pub fn build_report(
    ingested: &Ingested,
    aggregates: &Aggregates<'_>,
    config: &AnalysisConfig,
    generated_at: NaiveDateTime,
) -> ReportModel {
    let totals = &aggregates.totals;
    let summary = Summary {
        total_distance_km: totals.distance_km,
        total_duration_secs: totals.duration_secs,
        total_duration_display: format_duration(totals.duration_secs),
        total_calories: totals.calories,
        total_activities: totals.activities,
        total_elevation_m: totals.elevation_m,
        skipped_rows: ingested.skipped.len(),
        year_scope: config.year_scope,
        scope_year: aggregates.scope_year,
        max_hr: config.max_hr,
        rest_hr: config.rest_hr,
        sport_filter: config.sport_filter.clone(),
    };

    let monthly = aggregates
        .monthly
        .iter()
        .map(|m| MonthlyBucket {
            month: format!("{:04}-{:02}", m.year, m.month),
            distance_km: m.distance_km,
        })
        .collect();

    let cumulative = aggregates
        .cumulative
        .iter()
        .map(|p| CumulativePoint {
            date: p.date.format("%Y-%m-%d").to_string(),
            total_km: p.total_km,
        })
        .collect();

    let hr_zones = aggregates
        .hr_zones
        .iter()
        .zip(ZONE_LABELS)
        .enumerate()
        .map(|(idx, (count, label))| HrZoneBucket {
            zone: idx as u8 + 1,
            label: label.to_string(),
            count: *count,
        })
        .collect();

    let cadence = aggregates
        .cadence
        .iter()
        .map(|b| CadenceBucket {
            lower_spm: b.lower_spm,
            upper_spm: b.upper_spm,
            label: format!("{}-{}", b.lower_spm, b.upper_spm),
            count: b.count,
        })
        .collect();

    let pace_hr = aggregates
        .pace_hr
        .iter()
        .map(|p| PaceHrPoint {
            pace_min_per_km: p.pace_secs_per_km / 60.0,
            avg_hr: p.avg_hr,
            activity_type: p.activity.activity_type.clone(),
            title: p.activity.title.clone(),
            date: p.activity.date.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let activity_types = aggregates
        .activity_types
        .iter()
        .map(|t| TypeBreakdown {
            activity_type: t.activity_type.clone(),
            count: t.count,
            distance_km: t.distance_km,
            duration_secs: t.duration_secs,
        })
        .collect();

    let mut by_recency: Vec<&Activity> = ingested.activities.iter().collect();
    by_recency.sort_by(|a, b| b.date.cmp(&a.date));

    ReportModel {
        generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        summary,
        monthly,
        cumulative,
        hr_zones,
        cadence,
        pace_hr,
        top_distance: aggregates.top_distance.iter().copied().map(ActivityRow::from).collect(),
        top_climb: aggregates.top_climb.iter().copied().map(ActivityRow::from).collect(),
        activity_types,
        activities: by_recency.into_iter().map(ActivityRow::from).collect(),
    }
}
