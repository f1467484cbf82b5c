use activity_stats::aggregate::{aggregate, hr_zone_index};
use activity_stats::{
    Activity, AnalysisConfig, StatsError, YearScope, generate_report, generate_report_from_csv,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

const FIXTURE: &str = include_str!("fixtures/activities.csv");

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid date")
}

fn generated() -> NaiveDateTime {
    at(2025, 4, 1)
}

fn mixed_years() -> Vec<Activity> {
    vec![
        Activity::new(at(2024, 11, 3), 12.0, 3900.0).with_hr(140),
        Activity::new(at(2024, 12, 28), 30.0, 10800.0).with_hr(155).with_elevation(300.0),
        Activity::new(at(2025, 1, 4), 6.5, 2100.0).with_hr(132).with_cadence(168),
        Activity::new(at(2025, 1, 4), 6.5, 2000.0).with_elevation(40.0),
        Activity::new(at(2025, 2, 14), 15.0, 4700.0).with_hr(171).with_cadence(176),
        Activity::new(at(2025, 3, 1), 42.2, 14000.0).with_hr(163).with_elevation(300.0),
    ]
}

#[test]
fn monthly_sum_matches_scoped_total() {
    for scope in [YearScope::AllYears, YearScope::PerYear, YearScope::LatestYear] {
        let cfg = AnalysisConfig {
            year_scope: scope,
            ..AnalysisConfig::default()
        };
        let acts = mixed_years();
        let agg = aggregate(&acts, &cfg);
        let expected: f64 = acts
            .iter()
            .filter(|a| agg.scope_year.is_none_or(|y| a.date.year() == y))
            .map(|a| a.distance_km)
            .sum();
        let monthly: f64 = agg.monthly.iter().map(|m| m.distance_km).sum();
        assert!((monthly - expected).abs() < 1e-9, "scope {scope}");
    }
}

#[test]
fn cumulative_non_decreasing_within_year_and_ends_at_ytd_total() {
    let cfg = AnalysisConfig {
        year_scope: YearScope::PerYear,
        ..AnalysisConfig::default()
    };
    let acts = mixed_years();
    let agg = aggregate(&acts, &cfg);

    for pair in agg.cumulative.windows(2) {
        if pair[0].date.year() == pair[1].date.year() {
            assert!(pair[1].total_km >= pair[0].total_km);
        }
    }
    let ytd: f64 = acts
        .iter()
        .filter(|a| a.date.year() == 2025)
        .map(|a| a.distance_km)
        .sum();
    let last = agg.cumulative.last().expect("points").total_km;
    assert!((last - ytd).abs() < 1e-9);
}

#[test]
fn default_cumulative_runs_across_years() {
    let acts = mixed_years();
    let agg = aggregate(&acts, &AnalysisConfig::default());
    for pair in agg.cumulative.windows(2) {
        assert!(pair[1].total_km >= pair[0].total_km);
    }
    let all: f64 = acts.iter().map(|a| a.distance_km).sum();
    let last = agg.cumulative.last().expect("points").total_km;
    assert!((last - all).abs() < 1e-9);
    assert_eq!(agg.monthly.len(), 5);
}

#[test]
fn every_known_hr_lands_in_exactly_one_zone() {
    let cfg = AnalysisConfig::default();
    let acts = mixed_years();
    let agg = aggregate(&acts, &cfg);
    let known = acts.iter().filter(|a| a.avg_hr.is_some()).count();
    assert_eq!(agg.hr_zones.iter().sum::<usize>(), known);
    assert_eq!(hr_zone_index(165, &cfg), Some(4));
}

#[test]
fn distance_leaderboard_sorted_and_bounded() {
    let cfg = AnalysisConfig {
        top_n: 3,
        ..AnalysisConfig::default()
    };
    let acts = mixed_years();
    let agg = aggregate(&acts, &cfg);
    assert_eq!(agg.top_distance.len(), 3);
    for pair in agg.top_distance.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.distance_km > b.distance_km || (a.distance_km == b.distance_km && a.date >= b.date));
    }
    // equal 300 m climbs: most recent wins
    assert_eq!(agg.top_climb[0].date, at(2025, 3, 1));
}

#[test]
fn one_valid_row_gives_single_entry_report() {
    let csv = "Date,Distance,Time,Avg HR,Total Ascent\n2025-05-05 06:00:00,7.5,00:40:00,150,30\n";
    let report =
        generate_report_from_csv(csv.as_bytes(), &AnalysisConfig::default(), generated()).expect("report");
    assert_eq!(report.summary.total_activities, 1);
    assert_eq!(report.top_distance.len(), 1);
    assert_eq!(report.top_climb.len(), 1);
    assert_eq!(report.activities.len(), 1);
    assert_eq!(report.monthly.len(), 1);
}

#[test]
fn header_only_csv_raises_empty_dataset() {
    let err = generate_report_from_csv(
        "Date,Distance,Time\n".as_bytes(),
        &AnalysisConfig::default(),
        generated(),
    )
    .unwrap_err();
    assert!(matches!(err, StatsError::EmptyDataset { .. }));
}

#[test]
fn invalid_config_fails_before_reading() {
    let cfg = AnalysisConfig {
        max_hr: 40,
        ..AnalysisConfig::default()
    };
    // Unreadable header would be MissingColumn; config wins because it is checked first.
    let err = generate_report_from_csv("nonsense".as_bytes(), &cfg, generated()).unwrap_err();
    assert!(matches!(err, StatsError::Config(_)));
    let err = generate_report(Vec::new(), &cfg, generated()).unwrap_err();
    assert!(matches!(err, StatsError::Config(_)));
}

#[test]
fn fixture_report_end_to_end() {
    let cfg = AnalysisConfig {
        sport_filter: Some("Running".into()),
        ..AnalysisConfig::default()
    };
    let report = generate_report_from_csv(FIXTURE.as_bytes(), &cfg, generated()).expect("report");
    assert_eq!(report.summary.total_activities, 7);
    assert_eq!(report.summary.skipped_rows, 1);
    assert_eq!(report.summary.total_calories, 1312 + 640 + 1450 + 560 + 250 + 1020 + 700);
    // running types only: long, track, easy, trail, year end
    assert_eq!(report.hr_zones.iter().map(|z| z.count).sum::<usize>(), 5);
    assert_eq!(report.pace_hr.len(), 5);
    assert_eq!(report.top_distance[0].activity_type, "Cycling");
    assert_eq!(report.top_climb[0].title.as_deref(), Some("Saturday Ride"));
    assert_eq!(report.activities[0].date, "2025-03-22");
    assert_eq!(report.activities.last().map(|a| a.date.as_str()), Some("2024-12-31"));
    assert_eq!(report.monthly.first().map(|m| m.month.as_str()), Some("2024-12"));
    assert_eq!(report.activity_types[0].activity_type, "Cycling");
}
