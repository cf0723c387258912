// Time-bucket aggregation: fold an unordered record stream into a fixed-width,
// gapless, zero-filled window sequence, then reduce each window for charting.
// Pure over its inputs; `now_ms` is an explicit parameter so output is
// deterministic and testable.

use std::collections::HashMap;

use crate::models::{Bucket, Series, SeriesPoint, TimestampedRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid bucket configuration: {0}")]
    InvalidConfiguration(String),
}

/// Per-window reduction semantics. `output` names the aggregate written into
/// `Bucket::aggregates`; it is initialized to 0.0 before any record is folded in.
#[derive(Debug, Clone)]
pub enum Reducer {
    /// Events per window; no named aggregate beyond `Bucket::count`.
    Count,
    /// Sum of a numeric attribute across the window's records.
    Sum { attribute: String, output: String },
    /// Mean of a numeric attribute; an empty window reports 0.0, never NaN.
    Mean { attribute: String, output: String },
}

impl Reducer {
    pub fn mean_of(attribute: &str, output: &str) -> Self {
        Reducer::Mean {
            attribute: attribute.to_string(),
            output: output.to_string(),
        }
    }

    pub fn sum_of(attribute: &str, output: &str) -> Self {
        Reducer::Sum {
            attribute: attribute.to_string(),
            output: output.to_string(),
        }
    }

    fn output_key(&self) -> Option<&str> {
        match self {
            Reducer::Count => None,
            Reducer::Sum { output, .. } | Reducer::Mean { output, .. } => Some(output),
        }
    }
}

/// Groups `records` into exactly `window_count` contiguous buckets of
/// `window_width_ms`, the last one ending at `now_ms` rounded up to the window
/// width (a `now` on a boundary is used as-is, so the in-progress window is
/// covered). Records outside the total window are silently dropped. Every bucket
/// exists with count 0 and zeroed aggregates even when no record lands in it.
pub fn bucketize(
    records: &[TimestampedRecord],
    window_count: usize,
    window_width_ms: i64,
    now_ms: i64,
    reducer: &Reducer,
) -> Result<Vec<Bucket>, AggregationError> {
    if window_width_ms <= 0 {
        return Err(AggregationError::InvalidConfiguration(format!(
            "window_width_ms must be > 0, got {window_width_ms}"
        )));
    }
    if window_count == 0 {
        return Err(AggregationError::InvalidConfiguration(
            "window_count must be > 0".to_string(),
        ));
    }

    let end_ms = round_up(now_ms, window_width_ms);
    let start_ms = end_ms - (window_count as i64) * window_width_ms;

    let mut buckets: Vec<Bucket> = (0..window_count)
        .map(|i| {
            let window_start_ms = start_ms + (i as i64) * window_width_ms;
            let mut aggregates = HashMap::new();
            if let Some(key) = reducer.output_key() {
                aggregates.insert(key.to_string(), 0.0);
            }
            Bucket {
                window_start_ms,
                window_end_ms: window_start_ms + window_width_ms,
                count: 0,
                aggregates,
            }
        })
        .collect();

    for record in records {
        if record.ts_ms < start_ms || record.ts_ms >= end_ms {
            continue;
        }
        let idx = ((record.ts_ms - start_ms) / window_width_ms) as usize;
        let bucket = &mut buckets[idx];
        bucket.count += 1;
        match reducer {
            Reducer::Count => {}
            Reducer::Sum { attribute, output } | Reducer::Mean { attribute, output } => {
                if let Some(v) = record.numeric_attribute(attribute) {
                    *bucket.aggregates.entry(output.clone()).or_insert(0.0) += v;
                }
            }
        }
    }

    if let Reducer::Mean { output, .. } = reducer {
        for bucket in &mut buckets {
            let sum = bucket.aggregates.get(output).copied().unwrap_or(0.0);
            let mean = if bucket.count == 0 {
                0.0
            } else {
                sum / bucket.count as f64
            };
            bucket.aggregates.insert(output.clone(), mean);
        }
    }

    Ok(buckets)
}

/// Which bucket field becomes the point value when converting to a series.
#[derive(Debug, Clone)]
pub enum SeriesSource {
    Count,
    Aggregate(String),
}

/// Converts buckets to a chart-ready series, labeling each point from its window
/// start (UTC, HH:MM). Label formatting lives here, not in bucketize, so bucket
/// math stays on numeric instants.
pub fn series_from_buckets(buckets: &[Bucket], source: &SeriesSource) -> Series {
    let points = buckets
        .iter()
        .map(|b| SeriesPoint {
            label: window_label(b.window_start_ms),
            value: match source {
                SeriesSource::Count => b.count as f64,
                SeriesSource::Aggregate(key) => b.aggregates.get(key).copied().unwrap_or(0.0),
            },
        })
        .collect();
    Series::real(points)
}

/// UTC HH:MM label for a window-start instant.
pub fn window_label(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn round_up(value: i64, multiple: i64) -> i64 {
    let rem = value.rem_euclid(multiple);
    if rem == 0 { value } else { value + (multiple - rem) }
}
