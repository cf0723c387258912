// Persistent preference port: last-selected time range, dismissed-alert ids.
// Injected into whatever component needs it; no global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Key-value string storage for small UI preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }
}

/// JSON file on disk, loaded eagerly, written through on every set.
/// A missing or unreadable file starts empty; a failed write is logged and the
/// in-memory value kept (preferences are best-effort, never fatal).
#[derive(Debug)]
pub struct JsonFilePrefs {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonFilePrefs {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(values) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to serialize preferences");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(error = %e, path = %self.path.display(), "failed to write preferences");
        }
    }
}

impl PreferenceStore for JsonFilePrefs {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }
}

/// Well-known preference keys used by the dashboard views.
pub mod keys {
    pub const TIME_RANGE: &str = "dashboard.time_range";
    pub const DISMISSED_ALERTS: &str = "dashboard.dismissed_alerts";
}
