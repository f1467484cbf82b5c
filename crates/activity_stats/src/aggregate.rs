//! Derived statistics over the ingested activity list.
//!
//! Every function here is pure: the same activities and config always give
//! the same output. Missing optional fields exclude an activity from the
//! statistic that needs them; they are never read as zero.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::Activity;
use crate::config::{AnalysisConfig, MAX_CADENCE_SPM, MIN_ZONED_HR, YearScope};

pub const ZONE_COUNT: usize = 5;

pub const ZONE_LABELS: [&str; ZONE_COUNT] = [
    "Z1 (Recovery)",
    "Z2 (Aerobic)",
    "Z3 (Tempo)",
    "Z4 (Threshold)",
    "Z5 (Anaerobic)",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Totals {
    pub activities: usize,
    pub distance_km: f64,
    pub duration_secs: f64,
    pub elevation_m: f64,
    /// Sum over activities that reported calories.
    pub calories: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyDistance {
    pub year: i32,
    pub month: u32,
    pub distance_km: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeDistance {
    pub date: NaiveDate,
    pub total_km: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CadenceBin {
    pub lower_spm: u32,
    pub upper_spm: u32,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaceHrPair<'a> {
    pub pace_secs_per_km: f64,
    pub avg_hr: u32,
    pub activity: &'a Activity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeTotals {
    pub activity_type: String,
    pub count: usize,
    pub distance_km: f64,
    pub duration_secs: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aggregates<'a> {
    pub totals: Totals,
    /// Set when the series are restricted to a single year.
    pub scope_year: Option<i32>,
    pub monthly: Vec<MonthlyDistance>,
    pub cumulative: Vec<CumulativeDistance>,
    pub hr_zones: [usize; ZONE_COUNT],
    pub cadence: Vec<CadenceBin>,
    pub pace_hr: Vec<PaceHrPair<'a>>,
    pub top_distance: Vec<&'a Activity>,
    pub top_climb: Vec<&'a Activity>,
    pub activity_types: Vec<TypeTotals>,
}

pub fn aggregate<'a>(activities: &'a [Activity], config: &AnalysisConfig) -> Aggregates<'a> {
    let scope_year = match config.year_scope {
        YearScope::LatestYear => activities.iter().map(|a| a.date.year()).max(),
        YearScope::AllYears | YearScope::PerYear => None,
    };
    let in_scope = |a: &Activity| scope_year.is_none_or(|y| a.date.year() == y);

    let aggregates = Aggregates {
        totals: totals(activities),
        scope_year,
        monthly: monthly_distance(activities.iter().filter(|&a| in_scope(a))),
        cumulative: cumulative_distance(
            activities.iter().filter(|&a| in_scope(a)),
            config.year_scope,
        ),
        hr_zones: hr_zone_distribution(activities, config),
        cadence: cadence_histogram(activities, config),
        pace_hr: pace_hr_pairs(activities, config),
        top_distance: leaderboard(activities, config.top_n, |a| a.distance_km),
        top_climb: leaderboard(activities, config.top_n, |a| a.elevation_gain_m),
        activity_types: type_breakdown(activities),
    };
    debug!(
        months = aggregates.monthly.len(),
        cumulative = aggregates.cumulative.len(),
        cadence_bins = aggregates.cadence.len(),
        pace_hr = aggregates.pace_hr.len(),
        "aggregated statistics"
    );
    aggregates
}

pub fn totals(activities: &[Activity]) -> Totals {
    activities.iter().fold(Totals::default(), |mut t, a| {
        t.activities += 1;
        t.distance_km += a.distance_km;
        t.duration_secs += a.duration_secs;
        t.elevation_m += a.elevation_gain_m;
        t.calories += a.calories.map(u64::from).unwrap_or(0);
        t
    })
}

/// Distance per observed `(year, month)`, chronological. Months without
/// activities are not synthesized.
pub fn monthly_distance<'a, I>(activities: I) -> Vec<MonthlyDistance>
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for a in activities {
        *months.entry((a.date.year(), a.date.month())).or_insert(0.0) += a.distance_km;
    }
    months
        .into_iter()
        .map(|((year, month), distance_km)| MonthlyDistance {
            year,
            month,
            distance_km,
        })
        .collect()
}

/// Running distance total, one point per activity in date order. Same-day
/// activities keep their input order.
pub fn cumulative_distance<'a, I>(activities: I, scope: YearScope) -> Vec<CumulativeDistance>
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut sorted: Vec<&Activity> = activities.into_iter().collect();
    sorted.sort_by_key(|a| a.date);

    let mut running = 0.0;
    let mut current_year = None;
    sorted
        .into_iter()
        .map(|a| {
            let year = a.date.year();
            if scope == YearScope::PerYear && current_year != Some(year) {
                running = 0.0;
            }
            current_year = Some(year);
            running += a.distance_km;
            CumulativeDistance {
                date: a.date.date(),
                total_km: running,
            }
        })
        .collect()
}

/// Heart rate reserve fraction, clamped to `[0, 1]`.
pub fn hrr_fraction(hr: u32, config: &AnalysisConfig) -> f64 {
    let fraction = (f64::from(hr) - f64::from(config.rest_hr)) / config.hr_reserve();
    fraction.clamp(0.0, 1.0)
}

/// Zero-based zone index, or `None` for an implausibly low HR below a raised
/// zone floor.
///
/// Zones split `[zone_floor, 1]` of the HR reserve into equal widths, each
/// closed at its lower bound. Anything below the floor is Z1 and anything at
/// or above max HR is Z5. Bounds are compared as
/// `ZONE_COUNT * (hr - rest) >= reserve * (ZONE_COUNT * floor + k * (1 - floor))`
/// so a bound that falls on a whole bpm is not lost to division rounding.
pub fn hr_zone_index(hr: u32, config: &AnalysisConfig) -> Option<usize> {
    let zones = ZONE_COUNT as f64;
    let floor = config.zone_floor;
    let scaled = zones * (f64::from(hr) - f64::from(config.rest_hr));
    let reserve = config.hr_reserve();
    let reaches = |k: usize| scaled >= reserve * (zones * floor + k as f64 * (1.0 - floor));

    if floor > 0.0 && hr <= MIN_ZONED_HR && !reaches(0) {
        return None;
    }
    Some((1..ZONE_COUNT).filter(|&k| reaches(k)).count())
}

pub fn hr_zone_distribution(activities: &[Activity], config: &AnalysisConfig) -> [usize; ZONE_COUNT] {
    let mut zones = [0usize; ZONE_COUNT];
    for a in activities
        .iter()
        .filter(|a| a.matches_sport(config.sport_filter.as_deref()))
    {
        if let Some(zone) = a.avg_hr.and_then(|hr| hr_zone_index(hr, config)) {
            zones[zone] += 1;
        }
    }
    zones
}

/// Fixed-width cadence histogram, contiguous from the lowest to the highest
/// occupied bin. Cadence above [`MAX_CADENCE_SPM`] is ignored.
pub fn cadence_histogram(activities: &[Activity], config: &AnalysisConfig) -> Vec<CadenceBin> {
    let width = config.cadence_bin_width;
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for a in activities
        .iter()
        .filter(|a| a.matches_sport(config.sport_filter.as_deref()))
    {
        if let Some(cadence) = a.avg_cadence.filter(|c| *c <= MAX_CADENCE_SPM) {
            *counts.entry(cadence / width).or_insert(0) += 1;
        }
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };
    (first..=last)
        .map(|bin| {
            let lower_spm = bin.saturating_mul(width);
            CadenceBin {
                lower_spm,
                upper_spm: lower_spm.saturating_add(width),
                count: counts.get(&bin).copied().unwrap_or(0),
            }
        })
        .collect()
}

pub fn pace_hr_pairs<'a>(activities: &'a [Activity], config: &AnalysisConfig) -> Vec<PaceHrPair<'a>> {
    activities
        .iter()
        .filter(|a| a.matches_sport(config.sport_filter.as_deref()))
        .filter_map(|a| {
            let avg_hr = a.avg_hr?;
            let pace_secs_per_km = a.pace_secs_per_km()?;
            Some(PaceHrPair {
                pace_secs_per_km,
                avg_hr,
                activity: a,
            })
        })
        .collect()
}

/// Top `n` by `metric`, descending. Equal values rank the most recent
/// activity first; full ties keep input order.
pub fn leaderboard<F>(activities: &[Activity], n: usize, metric: F) -> Vec<&Activity>
where
    F: Fn(&Activity) -> f64,
{
    let mut ranked: Vec<&Activity> = activities.iter().collect();
    ranked.sort_by(|a, b| {
        metric(*b)
            .total_cmp(&metric(*a))
            .then_with(|| b.date.cmp(&a.date))
    });
    ranked.truncate(n);
    ranked
}

/// Per activity type totals, largest distance first.
pub fn type_breakdown(activities: &[Activity]) -> Vec<TypeTotals> {
    let mut by_type: BTreeMap<&str, TypeTotals> = BTreeMap::new();
    for a in activities {
        let entry = by_type
            .entry(a.activity_type.as_str())
            .or_insert_with(|| TypeTotals {
                activity_type: a.activity_type.clone(),
                count: 0,
                distance_km: 0.0,
                duration_secs: 0.0,
            });
        entry.count += 1;
        entry.distance_km += a.distance_km;
        entry.duration_secs += a.duration_secs;
    }
    let mut out: Vec<TypeTotals> = by_type.into_values().collect();
    out.sort_by(|a, b| {
        b.distance_km
            .partial_cmp(&a.distance_km)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.activity_type.cmp(&b.activity_type))
    });
    out
}
