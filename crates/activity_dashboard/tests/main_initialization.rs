/// Tests for the binary's logging setup
use activity_dashboard::{LOG_LEVEL_ENV, env_filter, log_filter_with};

#[test]
fn test_log_env_priority() {
    let result = log_filter_with(false, |key| match key {
        LOG_LEVEL_ENV => Some("warn".to_string()),
        "RUST_LOG" => Some("trace".to_string()),
        _ => None,
    });
    assert_eq!(result, "warn");
}

#[test]
fn test_blank_level_falls_through() {
    let result = log_filter_with(false, |key| match key {
        LOG_LEVEL_ENV => Some("  ".to_string()),
        "RUST_LOG" => Some("activity_stats=debug".to_string()),
        _ => None,
    });
    assert_eq!(result, "activity_stats=debug");
}

#[test]
fn test_default_is_info() {
    assert_eq!(log_filter_with(false, |_| None), "info");
}

#[test]
fn test_env_filter_creation() {
    let filter = env_filter("info,activity_stats=debug");
    assert!(format!("{filter}").contains("activity_stats=debug"));
}

#[test]
fn test_env_filter_fallback() {
    // Invalid directives must not panic
    let filter = env_filter("invalid[[[filter");
    let rendered = format!("{filter}");
    assert!(rendered.contains("info"));
    assert!(!rendered.contains("invalid"));
}
