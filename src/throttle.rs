// Per-key rate limiting for push-triggered cache invalidations. A burst of push
// events for one resource must not fan out into an invalidation storm: at most
// one invalidation per key per throttle window, full-sync bypass excepted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::models::InvalidationKey;
use tracing::trace;

/// Process-lifetime throttle. State is a key -> last-invalidation instant map;
/// entries are never evicted (the dashboard's key set is small and fixed).
/// Decisions for a key are serialized behind the mutex, so the one-per-window
/// guarantee holds under concurrent callers as well as on an event loop.
#[derive(Debug)]
pub struct InvalidationThrottler {
    window_ms: i64,
    last_invalidation_ms: Mutex<HashMap<InvalidationKey, i64>>,
    permitted_total: AtomicU64,
    suppressed_total: AtomicU64,
}

impl InvalidationThrottler {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as i64,
            last_invalidation_ms: Mutex::new(HashMap::new()),
            permitted_total: AtomicU64::new(0),
            suppressed_total: AtomicU64::new(0),
        }
    }

    /// True: the invalidation proceeds now and the key's timestamp is recorded.
    /// False: suppressed, state unchanged. A key with no recorded timestamp is
    /// treated as invalidated infinitely long ago, so its first call proceeds.
    pub fn try_invalidate(&self, key: &InvalidationKey, now_ms: i64) -> bool {
        let mut state = self
            .last_invalidation_ms
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let permitted = match state.get(key) {
            Some(&last) => now_ms - last > self.window_ms,
            None => true,
        };
        if permitted {
            state.insert(key.clone(), now_ms);
            self.permitted_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.suppressed_total.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "invalidation suppressed by throttle window");
        }
        permitted
    }

    /// Unconditional invalidation for the full-refresh-on-reconnect category: a
    /// reconnect may have missed an unbounded number of updates, so the window
    /// does not apply. Still records the timestamp, so an immediately following
    /// throttled call is suppressed.
    pub fn force_invalidate(&self, key: &InvalidationKey, now_ms: i64) {
        let mut state = self
            .last_invalidation_ms
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        state.insert(key.clone(), now_ms);
        self.permitted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn permitted_total(&self) -> u64 {
        self.permitted_total.load(Ordering::Relaxed)
    }

    pub fn suppressed_total(&self) -> u64 {
        self.suppressed_total.load(Ordering::Relaxed)
    }
}
