// Scalar metric sanitization: clamp/rescale percentages, classify health bands.
// Upstream reports rates in mixed shapes (0-1, 0-100, raw counts, null, NaN);
// everything leaving this module is a finite number in [0, 100].

use serde::Deserialize;

/// Normalizes an upstream rate or percentage into [0, 100].
/// Non-finite input becomes 0.0 so NaN never reaches a view.
/// `is_already_percent = false` treats the value as a decimal rate and scales by 100.
/// Idempotent: re-normalizing an already-normalized value is a no-op.
pub fn normalize_percentage(value: f64, is_already_percent: bool) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let pct = if is_already_percent {
        value
    } else {
        value * 100.0
    };
    pct.clamp(0.0, 100.0)
}

/// Normalized value formatted with a fixed number of decimals and a trailing `%`.
pub fn format_percentage(value: f64, is_already_percent: bool, decimals: usize) -> String {
    format!(
        "{:.*}%",
        decimals,
        normalize_percentage(value, is_already_percent)
    )
}

/// Cutoffs for classifying a percentage into a health band.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HealthThresholds {
    pub healthy_percent: f64,
    pub degraded_percent: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            healthy_percent: 90.0,
            degraded_percent: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Healthy,
    Degraded,
    Critical,
}

impl HealthBand {
    /// Classifies a raw upstream value; normalizes first, so NaN and out-of-range
    /// inputs land in Critical rather than panicking or misreporting.
    pub fn classify(value: f64, is_already_percent: bool, thresholds: &HealthThresholds) -> Self {
        let pct = normalize_percentage(value, is_already_percent);
        if pct >= thresholds.healthy_percent {
            HealthBand::Healthy
        } else if pct >= thresholds.degraded_percent {
            HealthBand::Degraded
        } else {
            HealthBand::Critical
        }
    }
}
