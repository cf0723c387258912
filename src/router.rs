// Push-event routing: map each push-channel message type to the cache keys whose
// data it invalidates, then drive the throttler and signal the cache port.

use std::sync::{Arc, Mutex};

use crate::cache::CacheInvalidate;
use crate::models::{AgentStatus, InvalidationKey, PushEvent, PushEventType};
use crate::throttle::InvalidationThrottler;
use tracing::debug;

/// Fixed event-type -> key mapping plus the last-seen agent status used to
/// suppress no-op status repeats.
pub struct PushEventRouter {
    throttler: Arc<InvalidationThrottler>,
    last_status: Mutex<Option<AgentStatus>>,
}

impl PushEventRouter {
    pub fn new(throttler: Arc<InvalidationThrottler>) -> Self {
        Self {
            throttler,
            last_status: Mutex::new(None),
        }
    }

    /// The keys this event invalidates. Unknown event types route to the empty
    /// set (new server-side types must not break older dashboards). A
    /// StatusChange whose status matches the last seen value routes nowhere.
    pub fn route(&self, event: &PushEvent) -> Vec<InvalidationKey> {
        match &event.event_type {
            PushEventType::MetricUpdate => vec![InvalidationKey::summary_metrics()],
            PushEventType::ActionRecorded => vec![InvalidationKey::recent_actions()],
            PushEventType::RoutingDecision => vec![InvalidationKey::routing_decisions()],
            PushEventType::StatusChange => {
                let status = event
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("status"))
                    .and_then(|s| s.as_str())
                    .map(AgentStatus::from_wire);
                let Some(status) = status else {
                    debug!("status change event without a status payload; ignored");
                    return vec![];
                };
                let mut last = self.last_status.lock().unwrap_or_else(|e| e.into_inner());
                if *last == Some(status) {
                    return vec![];
                }
                *last = Some(status);
                vec![InvalidationKey::agent_health()]
            }
            PushEventType::FullSync => InvalidationKey::all_known(),
            PushEventType::Unknown(t) => {
                debug!(event_type = %t, "unknown push event type; ignored");
                vec![]
            }
        }
    }

    /// Routes the event, consults the throttler per key, and signals the cache
    /// port for each permitted invalidation. FullSync bypasses the throttle
    /// unconditionally. Returns the number of invalidations that fired.
    pub fn dispatch(
        &self,
        event: &PushEvent,
        now_ms: i64,
        cache: &impl CacheInvalidate,
    ) -> usize {
        let bypass = event.event_type == PushEventType::FullSync;
        let mut fired = 0;
        for key in self.route(event) {
            let permitted = if bypass {
                self.throttler.force_invalidate(&key, now_ms);
                true
            } else {
                self.throttler.try_invalidate(&key, now_ms)
            };
            if permitted {
                cache.invalidate(&key);
                fired += 1;
            }
        }
        fired
    }
}
