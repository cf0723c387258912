// Replay a synthetic push feed through the full sync pipeline and print the
// resulting chart series as JSON.
//
// Usage: cargo run --example feed_replay -- [EVENT_COUNT]
//   EVENT_COUNT  default: 30

use std::env;
use std::sync::Arc;
use std::time::Duration;

use agentpulse::aggregation::{Reducer, SeriesSource, bucketize, series_from_buckets};
use agentpulse::cache::{CacheConfig, PollingCache, RecordFetcher};
use agentpulse::config::AppConfig;
use agentpulse::models::{
    ConnectionState, InvalidationKey, PushEvent, PushEventType, TimestampedRecord,
};
use agentpulse::router::PushEventRouter;
use agentpulse::synth::ensure_minimum_series;
use agentpulse::sync_worker::{SyncDeps, SyncWorkerConfig, spawn};
use agentpulse::throttle::InvalidationThrottler;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Fetcher that fabricates one action record per 90 seconds of lookback.
struct ReplayFetcher {
    now_ms: i64,
}

impl RecordFetcher for ReplayFetcher {
    fn fetch(
        &self,
        _key: &InvalidationKey,
    ) -> impl Future<Output = anyhow::Result<Vec<TimestampedRecord>>> + Send {
        let now_ms = self.now_ms;
        async move {
            let records = (0..13)
                .map(|i| {
                    TimestampedRecord::new(now_ms - i * 90_000)
                        .with_attribute("durationMs", 80 + (i % 5) * 40)
                })
                .collect();
            Ok(records)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let event_count: usize = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);

    let config = AppConfig::load().unwrap_or_else(|_| AppConfig::load_from_str("").unwrap());
    let now_ms = chrono::Utc::now().timestamp_millis();

    let throttler = Arc::new(InvalidationThrottler::new(Duration::from_millis(
        config.throttle.window_ms,
    )));
    let router = Arc::new(PushEventRouter::new(throttler.clone()));
    let cache = Arc::new(PollingCache::new(CacheConfig {
        refetch_interval_ms: config.cache.refetch_interval_ms,
        stale_time_ms: config.cache.stale_time_ms,
    }));
    let fetcher = Arc::new(ReplayFetcher { now_ms });

    let (push_tx, push_rx) = tokio::sync::mpsc::channel(config.sync.push_channel_capacity);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let (state_tx, state_rx) = tokio::sync::watch::channel(ConnectionState::Disconnected);

    let handle = spawn(
        SyncDeps {
            push_rx,
            router: router.clone(),
            throttler: throttler.clone(),
            cache: cache.clone(),
            fetcher,
            state_tx,
            shutdown_rx,
        },
        SyncWorkerConfig {
            poll_interval_ms: 50,
            stats_log_interval_secs: config.sync.stats_log_interval_secs,
        },
    );

    push_tx
        .send(PushEvent::new(PushEventType::FullSync, now_ms))
        .await?;
    for i in 0..event_count {
        let event_type = if i % 3 == 0 {
            PushEventType::ActionRecorded
        } else {
            PushEventType::MetricUpdate
        };
        push_tx
            .send(PushEvent::new(event_type, now_ms + i as i64 * 100))
            .await?;
    }

    // Let the worker drain the feed and run at least one poll tick.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let records = cache.records(&InvalidationKey::recent_actions());
    let buckets = bucketize(
        &records,
        config.bucketing.window_count,
        config.bucketing.window_width_ms,
        now_ms,
        &Reducer::mean_of("durationMs", "avgDurationMs"),
    )?;
    let series = series_from_buckets(&buckets, &SeriesSource::Aggregate("avgDurationMs".into()));
    let series = ensure_minimum_series(&series, &config.synthesis);

    println!("{}", serde_json::to_string_pretty(&series)?);
    tracing::info!(
        invalidations_permitted = throttler.permitted_total(),
        invalidations_suppressed = throttler.suppressed_total(),
        records = records.len(),
        synthetic = series.is_synthetic,
        connection = ?*state_rx.borrow(),
        "replay complete"
    );

    let _ = shutdown_tx.send(());
    let _ = handle.await;
    Ok(())
}
