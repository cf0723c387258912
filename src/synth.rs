// Placeholder series synthesis. An all-zero chart is indistinguishable from a
// broken integration, so an under-populated series is replaced with a seeded,
// deterministic baseline tagged `is_synthetic` for the views to label.

use crate::models::{Series, SeriesPoint};
use serde::Deserialize;
use tracing::debug;

/// Thresholds and sizing for synthesis; see `AppConfig::synthesis` for defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SynthesisConfig {
    /// Minimum sum of point values for a series to count as real.
    pub minimum_total: f64,
    /// Anchor value for generated points.
    pub minimum_per_point: f64,
    /// Length of the generated series when the input is empty.
    pub default_len: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            minimum_total: 5.0,
            minimum_per_point: 2.0,
            default_len: 12,
        }
    }
}

/// Returns the input unchanged (`is_synthetic = false`) when its point sum meets
/// `minimum_total`; otherwise fabricates a same-length series (or `default_len`
/// points for empty input) anchored around `minimum_per_point` and flags it
/// synthetic. Never mutates the input; deterministic across calls.
pub fn ensure_minimum_series(series: &Series, config: &SynthesisConfig) -> Series {
    if !series.points.is_empty() && series.total() >= config.minimum_total {
        return Series::real(series.points.clone());
    }

    let len = if series.points.is_empty() {
        config.default_len
    } else {
        series.points.len()
    };
    debug!(
        input_len = series.points.len(),
        input_total = series.total(),
        synthetic_len = len,
        "series below minimum density; substituting synthetic baseline"
    );

    let mut rng = SeededPattern::new(0x5eed_da7a ^ len as u64);
    let points = (0..len)
        .map(|i| {
            let label = series
                .points
                .get(i)
                .map(|p| p.label.clone())
                .unwrap_or_else(|| i.to_string());
            // Anchor +/- 40%, never negative.
            let value = (config.minimum_per_point * (0.6 + 0.8 * rng.next_unit())).max(0.0);
            SeriesPoint { label, value }
        })
        .collect();

    Series {
        points,
        is_synthetic: true,
    }
}

/// Small xorshift generator; seeded per call so identical inputs yield identical
/// synthetic series. Not a statistical RNG, just a stable visual jitter source.
struct SeededPattern {
    state: u64,
}

impl SeededPattern {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    /// Next value in [0, 1).
    fn next_unit(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}
