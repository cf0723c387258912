// Domain models for the dashboard data layer (records, buckets, series, push events)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One timestamped record ingested by the aggregator (an agent action, a routing
/// decision, a metric sample). Immutable once received; timestamps are epoch ms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedRecord {
    pub ts_ms: i64,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl TimestampedRecord {
    pub fn new(ts_ms: i64) -> Self {
        Self {
            ts_ms,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Numeric view of an attribute. Non-numeric and non-finite values read as None
    /// so malformed upstream data never reaches a reducer.
    pub fn numeric_attribute(&self, key: &str) -> Option<f64> {
        self.attributes
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

/// One fixed-width aggregation window. Rebuilt wholesale on every bucketize call,
/// never mutated afterwards. `[window_start_ms, window_end_ms)` is half-open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub window_start_ms: i64,
    pub window_end_ms: i64,
    pub count: u64,
    pub aggregates: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Chart-ready series. `is_synthetic` is true when the points are a fabricated
/// placeholder rather than derived from real records; views must render a
/// synthetic-data indicator whenever it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub points: Vec<SeriesPoint>,
    pub is_synthetic: bool,
}

impl Series {
    pub fn real(points: Vec<SeriesPoint>) -> Self {
        Self {
            points,
            is_synthetic: false,
        }
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

/// Opaque identifier for a logical cached resource: a query's canonical name plus
/// its parameters. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationKey {
    pub query: String,
    pub params: Option<String>,
}

impl InvalidationKey {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            params: None,
        }
    }

    pub fn with_params(query: &str, params: &str) -> Self {
        Self {
            query: query.to_string(),
            params: Some(params.to_string()),
        }
    }

    // The dashboard's fixed key set.
    pub fn summary_metrics() -> Self {
        Self::new("summary_metrics")
    }

    pub fn recent_actions() -> Self {
        Self::new("recent_actions")
    }

    pub fn agent_health() -> Self {
        Self::new("agent_health")
    }

    pub fn routing_decisions() -> Self {
        Self::new("routing_decisions")
    }

    /// Every key the router knows about; a full sync invalidates all of these.
    pub fn all_known() -> Vec<Self> {
        vec![
            Self::summary_metrics(),
            Self::recent_actions(),
            Self::agent_health(),
            Self::routing_decisions(),
        ]
    }
}

impl std::fmt::Display for InvalidationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.params {
            Some(p) => write!(f, "{}?{}", self.query, p),
            None => write!(f, "{}", self.query),
        }
    }
}

/// Push-channel message types. Unknown server-side types deserialize to
/// `Unknown` and are ignored by the router (forward compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PushEventType {
    MetricUpdate,
    ActionRecorded,
    RoutingDecision,
    StatusChange,
    /// Full refresh on reconnect/initial sync; bypasses the throttle.
    FullSync,
    Unknown(String),
}

impl From<String> for PushEventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AGENT_METRIC_UPDATE" => PushEventType::MetricUpdate,
            "AGENT_ACTION_RECORDED" => PushEventType::ActionRecorded,
            "ROUTING_DECISION" => PushEventType::RoutingDecision,
            "AGENT_STATUS_CHANGE" => PushEventType::StatusChange,
            "FULL_SYNC" => PushEventType::FullSync,
            _ => PushEventType::Unknown(s),
        }
    }
}

impl From<PushEventType> for String {
    fn from(t: PushEventType) -> Self {
        match t {
            PushEventType::MetricUpdate => "AGENT_METRIC_UPDATE".to_string(),
            PushEventType::ActionRecorded => "AGENT_ACTION_RECORDED".to_string(),
            PushEventType::RoutingDecision => "ROUTING_DECISION".to_string(),
            PushEventType::StatusChange => "AGENT_STATUS_CHANGE".to_string(),
            PushEventType::FullSync => "FULL_SYNC".to_string(),
            PushEventType::Unknown(s) => s,
        }
    }
}

/// One message from the external push channel. Immutable, consumed once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub event_type: PushEventType,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    pub ts_ms: i64,
}

impl PushEvent {
    pub fn new(event_type: PushEventType, ts_ms: i64) -> Self {
        Self {
            event_type,
            payload: None,
            ts_ms,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Push-channel connection state as observed by the sync worker. A reconnect
/// is expected to be followed by a FULL_SYNC event from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Agent status carried by StatusChange payloads; serializes to lowercase JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Degraded,
    Offline,
    #[serde(other)]
    Unknown,
}

impl AgentStatus {
    /// Parse from a payload status string (e.g. "online", "degraded").
    pub fn from_wire(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => AgentStatus::Online,
            "degraded" => AgentStatus::Degraded,
            "offline" => AgentStatus::Offline,
            _ => AgentStatus::Unknown,
        }
    }
}
