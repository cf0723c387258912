use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::metrics::HealthThresholds;
use crate::synth::SynthesisConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub bucketing: BucketingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub health: HealthThresholds,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    pub window_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { window_ms: 1000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketingConfig {
    pub window_count: usize,
    pub window_width_ms: i64,
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            window_count: 20,
            window_width_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    /// How often to log sync stats at INFO level.
    pub stats_log_interval_secs: u64,
    /// Buffered push events before the channel applies backpressure.
    pub push_channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            stats_log_interval_secs: 60,
            push_channel_capacity: 64,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.throttle.window_ms > 0,
            "throttle.window_ms must be > 0, got {}",
            self.throttle.window_ms
        );
        anyhow::ensure!(
            self.bucketing.window_count > 0,
            "bucketing.window_count must be > 0, got {}",
            self.bucketing.window_count
        );
        anyhow::ensure!(
            self.bucketing.window_width_ms > 0,
            "bucketing.window_width_ms must be > 0, got {}",
            self.bucketing.window_width_ms
        );
        anyhow::ensure!(
            self.synthesis.minimum_total >= 0.0 && self.synthesis.minimum_total.is_finite(),
            "synthesis.minimum_total must be a finite number >= 0, got {}",
            self.synthesis.minimum_total
        );
        anyhow::ensure!(
            self.synthesis.minimum_per_point >= 0.0 && self.synthesis.minimum_per_point.is_finite(),
            "synthesis.minimum_per_point must be a finite number >= 0, got {}",
            self.synthesis.minimum_per_point
        );
        anyhow::ensure!(
            self.synthesis.default_len > 0,
            "synthesis.default_len must be > 0, got {}",
            self.synthesis.default_len
        );
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.health.healthy_percent)
                && (0.0..=100.0).contains(&self.health.degraded_percent),
            "health thresholds must be within [0, 100], got healthy={} degraded={}",
            self.health.healthy_percent,
            self.health.degraded_percent
        );
        anyhow::ensure!(
            self.health.degraded_percent <= self.health.healthy_percent,
            "health.degraded_percent must be <= health.healthy_percent, got {} > {}",
            self.health.degraded_percent,
            self.health.healthy_percent
        );
        anyhow::ensure!(
            self.cache.refetch_interval_ms > 0,
            "cache.refetch_interval_ms must be > 0, got {}",
            self.cache.refetch_interval_ms
        );
        anyhow::ensure!(
            self.cache.stale_time_ms > 0,
            "cache.stale_time_ms must be > 0, got {}",
            self.cache.stale_time_ms
        );
        anyhow::ensure!(
            self.sync.poll_interval_ms > 0,
            "sync.poll_interval_ms must be > 0, got {}",
            self.sync.poll_interval_ms
        );
        anyhow::ensure!(
            self.sync.stats_log_interval_secs > 0,
            "sync.stats_log_interval_secs must be > 0, got {}",
            self.sync.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.sync.push_channel_capacity > 0,
            "sync.push_channel_capacity must be > 0, got {}",
            self.sync.push_channel_capacity
        );
        Ok(())
    }
}
