// TimeBucketAggregator tests: window layout, zero-fill, reducers, bad config

use agentpulse::aggregation::{
    AggregationError, Reducer, SeriesSource, bucketize, series_from_buckets,
};
use agentpulse::models::TimestampedRecord;
use chrono::{TimeZone, Utc};

const MINUTE_MS: i64 = 60_000;

fn record(ts_ms: i64) -> TimestampedRecord {
    TimestampedRecord::new(ts_ms)
}

fn utc_ms(h: u32, m: u32, s: u32) -> i64 {
    Utc.with_ymd_and_hms(2026, 8, 26, h, m, s)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn empty_records_yield_all_zero_buckets() {
    let buckets = bucketize(&[], 10, MINUTE_MS, utc_ms(12, 0, 0), &Reducer::Count).unwrap();
    assert_eq!(buckets.len(), 10);
    assert!(buckets.iter().all(|b| b.count == 0));
}

#[test]
fn buckets_are_contiguous_and_cover_the_lookback() {
    let now = utc_ms(9, 30, 0);
    let buckets = bucketize(&[], 15, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(buckets.len(), 15);
    assert_eq!(buckets.last().unwrap().window_end_ms, now);
    assert_eq!(buckets[0].window_start_ms, now - 15 * MINUTE_MS);
    for pair in buckets.windows(2) {
        assert_eq!(pair[0].window_end_ms, pair[1].window_start_ms);
    }
    for b in &buckets {
        assert_eq!(b.window_end_ms - b.window_start_ms, MINUTE_MS);
    }
}

#[test]
fn off_boundary_now_rounds_up_to_window_width() {
    let now = utc_ms(12, 0, 30);
    let buckets = bucketize(&[], 5, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(buckets.last().unwrap().window_end_ms, utc_ms(12, 1, 0));
    // One millisecond past a boundary still rounds to the next window.
    let buckets = bucketize(&[], 5, MINUTE_MS, utc_ms(12, 0, 0) + 1, &Reducer::Count).unwrap();
    assert_eq!(buckets.last().unwrap().window_end_ms, utc_ms(12, 1, 0));
}

#[test]
fn boundary_now_is_used_as_is() {
    let now = utc_ms(12, 0, 0);
    let buckets = bucketize(&[], 5, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(buckets.last().unwrap().window_end_ms, now);
}

#[test]
fn single_record_lands_in_its_window() {
    // 20 one-minute buckets, now = 12:00:00, one record at 11:41:30.
    let now = utc_ms(12, 0, 0);
    let records = vec![record(utc_ms(11, 41, 30)).with_attribute("durationMs", 120)];
    let buckets = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();

    assert_eq!(buckets.len(), 20);
    let hit = &buckets[1];
    assert_eq!(hit.window_start_ms, utc_ms(11, 41, 0));
    assert_eq!(hit.window_end_ms, utc_ms(11, 42, 0));
    assert_eq!(hit.count, 1);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
}

#[test]
fn records_outside_the_window_are_dropped() {
    let now = utc_ms(12, 0, 0);
    let records = vec![
        record(utc_ms(11, 0, 0)),  // before the lookback
        record(utc_ms(12, 0, 0)),  // at end: half-open, excluded
        record(utc_ms(11, 59, 59)),
    ];
    let buckets = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
}

#[test]
fn count_is_conserved_when_all_records_fall_inside() {
    let now = utc_ms(12, 0, 0);
    let records: Vec<_> = (0..50)
        .map(|i| record(now - 1 - i * 20_000))
        .collect();
    let buckets = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 50);
}

#[test]
fn mean_reducer_averages_per_window_and_reports_zero_for_empty() {
    let now = utc_ms(12, 0, 0);
    let records = vec![
        record(utc_ms(11, 58, 10)).with_attribute("durationMs", 100),
        record(utc_ms(11, 58, 40)).with_attribute("durationMs", 300),
    ];
    let reducer = Reducer::mean_of("durationMs", "avgDurationMs");
    let buckets = bucketize(&records, 5, MINUTE_MS, now, &reducer).unwrap();

    let hit = buckets.iter().find(|b| b.count == 2).unwrap();
    assert_eq!(hit.aggregates["avgDurationMs"], 200.0);
    for b in buckets.iter().filter(|b| b.count == 0) {
        assert_eq!(b.aggregates["avgDurationMs"], 0.0);
    }
}

#[test]
fn sum_reducer_skips_non_numeric_attributes() {
    let now = utc_ms(12, 0, 0);
    let records = vec![
        record(utc_ms(11, 59, 1)).with_attribute("tokens", 5),
        record(utc_ms(11, 59, 2)).with_attribute("tokens", "oops"),
        record(utc_ms(11, 59, 3)),
    ];
    let reducer = Reducer::sum_of("tokens", "totalTokens");
    let buckets = bucketize(&records, 2, MINUTE_MS, now, &reducer).unwrap();
    let hit = buckets.last().unwrap();
    assert_eq!(hit.count, 3);
    assert_eq!(hit.aggregates["totalTokens"], 5.0);
}

#[test]
fn deterministic_for_identical_inputs() {
    let now = utc_ms(12, 0, 0);
    let records: Vec<_> = (0..30).map(|i| record(now - i * 45_000)).collect();
    let a = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();
    let b = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_configuration_is_an_error() {
    let err = bucketize(&[], 0, MINUTE_MS, 0, &Reducer::Count).unwrap_err();
    assert!(matches!(err, AggregationError::InvalidConfiguration(_)));
    let err = bucketize(&[], 20, 0, 0, &Reducer::Count).unwrap_err();
    assert!(matches!(err, AggregationError::InvalidConfiguration(_)));
    let err = bucketize(&[], 20, -60_000, 0, &Reducer::Count).unwrap_err();
    assert!(matches!(err, AggregationError::InvalidConfiguration(_)));
}

#[test]
fn series_from_buckets_labels_window_starts() {
    let now = utc_ms(12, 0, 0);
    let records = vec![record(utc_ms(11, 41, 30))];
    let buckets = bucketize(&records, 20, MINUTE_MS, now, &Reducer::Count).unwrap();
    let series = series_from_buckets(&buckets, &SeriesSource::Count);

    assert_eq!(series.points.len(), 20);
    assert!(!series.is_synthetic);
    assert_eq!(series.points[0].label, "11:40");
    assert_eq!(series.points[1].label, "11:41");
    assert_eq!(series.points[1].value, 1.0);
    assert_eq!(series.total(), 1.0);
}
