// Dashboard data layer: push/poll cache sync, time-bucket aggregation,
// series synthesis, metric normalization.

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod models;
pub mod prefs;
pub mod router;
pub mod synth;
pub mod sync_worker;
pub mod throttle;
