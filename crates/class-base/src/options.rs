//! Runtime options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_ORDER: i64 = 10;
pub const DEFAULT_WAIT_MS: u64 = 200;
pub const DEFAULT_CHANGE_PREFIX: &str = "change:";

/// Defaults applied by the short forms of `on`, `debounce` and
/// `debounce_function`, plus the prefix of data change events.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Order used by [`on`](crate::EventsManager::on).
    pub default_order: i64,
    /// Wait used by [`debounce`](crate::DebounceManager::debounce) and
    /// debounced subscriptions, in milliseconds.
    pub default_wait_ms: u64,
    /// Prefix of the events emitted by [`set`](crate::DataManager::set).
    pub change_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_order: DEFAULT_ORDER,
            default_wait_ms: DEFAULT_WAIT_MS,
            change_prefix: DEFAULT_CHANGE_PREFIX.to_string(),
        }
    }
}

impl Options {
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_default_order(mut self, order: i64) -> Self {
        self.default_order = order;
        self
    }

    pub fn with_default_wait(mut self, wait: Duration) -> Self {
        self.default_wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_change_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.change_prefix = prefix.into();
        self
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }

    pub fn change_event(&self, path: &str) -> String {
        let mut name = String::with_capacity(self.change_prefix.len() + path.len());
        name.push_str(&self.change_prefix);
        name.push_str(path);
        name
    }
}
