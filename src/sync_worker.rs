// Background sync task: single select! loop joining the push channel and the
// polling timer, so invalidation decisions for a key never race. Push events go
// through the router (which consults the throttler); the poll tick refetches
// whatever the cache marks as due.

use std::sync::Arc;

use crate::cache::{PollingCache, RecordFetcher};
use crate::models::{ConnectionState, InvalidationKey, PushEvent};
use crate::router::PushEventRouter;
use crate::throttle::InvalidationThrottler;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

/// Channels, ports, and shutdown for the sync worker.
pub struct SyncDeps<F: RecordFetcher> {
    pub push_rx: mpsc::Receiver<PushEvent>,
    pub router: Arc<PushEventRouter>,
    pub throttler: Arc<InvalidationThrottler>,
    pub cache: Arc<PollingCache>,
    pub fetcher: Arc<F>,
    /// Mirrors the push channel's connection state for interested views.
    pub state_tx: watch::Sender<ConnectionState>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct SyncWorkerConfig {
    pub poll_interval_ms: u64,
    /// How often to log sync stats (permitted/suppressed invalidations, fetches).
    pub stats_log_interval_secs: u64,
}

pub fn spawn<F: RecordFetcher>(
    deps: SyncDeps<F>,
    config: SyncWorkerConfig,
) -> tokio::task::JoinHandle<()> {
    let SyncDeps {
        mut push_rx,
        router,
        throttler,
        cache,
        fetcher,
        state_tx,
        mut shutdown_rx,
    } = deps;

    tokio::spawn(async move {
        let _ = state_tx.send(ConnectionState::Connected);
        let mut poll_tick = interval(Duration::from_millis(config.poll_interval_ms));
        poll_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut fetches_total: u64 = 0;
        let mut fetches_discarded_total: u64 = 0;

        loop {
            tokio::select! {
                event = push_rx.recv() => {
                    match event {
                        Some(event) => {
                            let fired = router.dispatch(&event, epoch_ms(), cache.as_ref());
                            debug!(
                                event_type = ?event.event_type,
                                invalidations = fired,
                                "push event dispatched"
                            );
                        }
                        None => {
                            info!("push channel closed; sync worker exiting");
                            break;
                        }
                    }
                }
                _ = poll_tick.tick() => {
                    refetch_due_keys(
                        &cache,
                        fetcher.as_ref(),
                        &mut fetches_total,
                        &mut fetches_discarded_total,
                    )
                    .await;
                }
                _ = stats_log_tick.tick() => {
                    info!(
                        invalidations_permitted = throttler.permitted_total(),
                        invalidations_suppressed = throttler.suppressed_total(),
                        fetches_total,
                        fetches_discarded_total,
                        "sync stats"
                    );
                }
                _ = &mut shutdown_rx => {
                    debug!("sync worker shutting down");
                    break;
                }
            }
        }
        let _ = state_tx.send(ConnectionState::Disconnected);
    })
}

/// Refetches every known key the cache reports as due. Errors are logged and
/// skipped; the next tick retries. Results superseded by a newer fetch are
/// discarded by `PollingCache::apply`.
async fn refetch_due_keys<F: RecordFetcher>(
    cache: &PollingCache,
    fetcher: &F,
    fetches_total: &mut u64,
    fetches_discarded_total: &mut u64,
) {
    for key in InvalidationKey::all_known() {
        if !cache.needs_fetch(&key, epoch_ms()) {
            continue;
        }
        let generation = cache.begin_fetch(&key);
        match fetcher.fetch(&key).await {
            Ok(records) => {
                *fetches_total += 1;
                if !cache.apply(&key, generation, records, epoch_ms()) {
                    *fetches_discarded_total += 1;
                }
            }
            Err(e) => {
                warn!(error = %e, key = %key, operation = "fetch", "refetch failed");
            }
        }
    }
}

fn epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| {
            warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}
