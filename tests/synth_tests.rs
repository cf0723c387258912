// SeriesSynthesizer tests: passthrough, synthetic substitution, determinism

use agentpulse::models::{Series, SeriesPoint};
use agentpulse::synth::{SynthesisConfig, ensure_minimum_series};

fn series(values: &[f64]) -> Series {
    Series::real(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint {
                label: format!("{i:02}:00"),
                value: v,
            })
            .collect(),
    )
}

fn config() -> SynthesisConfig {
    SynthesisConfig {
        minimum_total: 5.0,
        minimum_per_point: 2.0,
        default_len: 12,
    }
}

#[test]
fn dense_series_passes_through_unchanged() {
    let input = series(&[3.0, 1.0, 2.0]);
    let out = ensure_minimum_series(&input, &config());
    assert!(!out.is_synthetic);
    assert_eq!(out.points, input.points);
}

#[test]
fn sum_exactly_at_threshold_is_kept() {
    let input = series(&[2.0, 2.0, 1.0]);
    let out = ensure_minimum_series(&input, &config());
    assert!(!out.is_synthetic);
}

#[test]
fn all_zero_series_becomes_synthetic_near_anchor() {
    let input = series(&[0.0, 0.0, 0.0]);
    let out = ensure_minimum_series(&input, &config());
    assert!(out.is_synthetic);
    assert_eq!(out.points.len(), 3);
    for p in &out.points {
        assert!(
            (1.0..=3.0).contains(&p.value),
            "expected value near 2, got {}",
            p.value
        );
    }
}

#[test]
fn synthetic_series_keeps_input_labels() {
    let input = series(&[0.0, 1.0, 0.0, 0.0]);
    let out = ensure_minimum_series(&input, &config());
    assert!(out.is_synthetic);
    let labels: Vec<_> = out.points.iter().map(|p| p.label.clone()).collect();
    let expected: Vec<_> = input.points.iter().map(|p| p.label.clone()).collect();
    assert_eq!(labels, expected);
}

#[test]
fn empty_input_gets_default_length() {
    let input = Series::real(vec![]);
    let out = ensure_minimum_series(&input, &config());
    assert!(out.is_synthetic);
    assert_eq!(out.points.len(), 12);
}

#[test]
fn synthesis_is_deterministic_across_calls() {
    let input = series(&[0.0; 8]);
    let a = ensure_minimum_series(&input, &config());
    let b = ensure_minimum_series(&input, &config());
    assert_eq!(a, b);
}

#[test]
fn input_is_never_mutated() {
    let input = series(&[0.0, 0.0]);
    let before = input.clone();
    let _ = ensure_minimum_series(&input, &config());
    assert_eq!(input, before);
}
