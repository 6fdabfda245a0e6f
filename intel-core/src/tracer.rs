//! Tracers collect key/value log entries emitted while tasks run.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sink for observability entries.
pub trait Tracer: Send + Sync {
    /// Record a single entry.
    fn log(&self, key: &str, value: Value);
}

/// A recorded tracer entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub key: String,
    pub value: Value,
    pub timestamp: DateTime<Utc>,
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTracer;

impl Tracer for NoOpTracer {
    fn log(&self, _key: &str, _value: Value) {}
}

/// Keeps entries in memory for later inspection.
#[derive(Debug, Default)]
pub struct InMemoryTracer {
    entries: Mutex<Vec<LogEntry>>,
}

impl InMemoryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in the order they were logged.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Values logged under `key`, oldest first.
    pub fn values(&self, key: &str) -> Vec<Value> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.key == key)
            .map(|entry| entry.value.clone())
            .collect()
    }
}

impl Tracer for InMemoryTracer {
    fn log(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                key: key.to_string(),
                value,
                timestamp: Utc::now(),
            });
    }
}

/// Forwards entries to `tracing` as debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn log(&self, key: &str, value: Value) {
        tracing::debug!(target: "intel::tracer", key, %value, "trace entry");
    }
}
