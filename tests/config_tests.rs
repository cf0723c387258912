// Config parsing and validation tests

use agentpulse::config::AppConfig;

#[test]
fn empty_config_uses_defaults() {
    let config = AppConfig::load_from_str("").unwrap();
    assert_eq!(config.throttle.window_ms, 1000);
    assert_eq!(config.bucketing.window_count, 20);
    assert_eq!(config.bucketing.window_width_ms, 60_000);
    assert_eq!(config.synthesis.minimum_total, 5.0);
    assert_eq!(config.synthesis.minimum_per_point, 2.0);
    assert_eq!(config.synthesis.default_len, 12);
    assert_eq!(config.health.healthy_percent, 90.0);
    assert_eq!(config.health.degraded_percent, 70.0);
    assert_eq!(config.cache.refetch_interval_ms, 30_000);
    assert_eq!(config.cache.stale_time_ms, 10_000);
    assert_eq!(config.sync.poll_interval_ms, 5_000);
}

#[test]
fn overrides_are_honored() {
    let toml = r#"
        [throttle]
        window_ms = 250

        [bucketing]
        window_count = 60
        window_width_ms = 30000

        [health]
        healthy_percent = 95.0
        degraded_percent = 60.0
    "#;
    let config = AppConfig::load_from_str(toml).unwrap();
    assert_eq!(config.throttle.window_ms, 250);
    assert_eq!(config.bucketing.window_count, 60);
    assert_eq!(config.bucketing.window_width_ms, 30_000);
    assert_eq!(config.health.healthy_percent, 95.0);
    assert_eq!(config.health.degraded_percent, 60.0);
    // Untouched sections keep defaults.
    assert_eq!(config.sync.push_channel_capacity, 64);
}

#[test]
fn zero_throttle_window_is_rejected() {
    let err = AppConfig::load_from_str("[throttle]\nwindow_ms = 0\n").unwrap_err();
    assert!(err.to_string().contains("throttle.window_ms"));
}

#[test]
fn zero_window_count_is_rejected() {
    let err = AppConfig::load_from_str("[bucketing]\nwindow_count = 0\nwindow_width_ms = 60000\n")
        .unwrap_err();
    assert!(err.to_string().contains("bucketing.window_count"));
}

#[test]
fn negative_window_width_is_rejected() {
    let err = AppConfig::load_from_str("[bucketing]\nwindow_count = 20\nwindow_width_ms = -5\n")
        .unwrap_err();
    assert!(err.to_string().contains("bucketing.window_width_ms"));
}

#[test]
fn inverted_health_thresholds_are_rejected() {
    let toml = "[health]\nhealthy_percent = 50.0\ndegraded_percent = 80.0\n";
    let err = AppConfig::load_from_str(toml).unwrap_err();
    assert!(err.to_string().contains("degraded_percent"));
}

#[test]
fn out_of_range_health_threshold_is_rejected() {
    let toml = "[health]\nhealthy_percent = 150.0\ndegraded_percent = 70.0\n";
    assert!(AppConfig::load_from_str(toml).is_err());
}

#[test]
fn malformed_toml_is_an_error() {
    assert!(AppConfig::load_from_str("not toml at all [").is_err());
}
