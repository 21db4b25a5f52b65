//! Fixed-length, time-ordered ring of metric snapshots.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::constants::METRICS_WINDOW_SIZE;

/// One point-in-time reading of the monitored metrics.
///
/// `time` is the display-formatted local wall-clock time captured at receipt,
/// not the source's own clock; the chart axis therefore reflects when the
/// dashboard saw the snapshot. Snapshots are immutable after creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// CPU usage percentage (0-100 expected, not enforced).
    pub cpu_usage: f64,
    /// Memory usage percentage.
    pub memory_usage: f64,
    /// Receipt time rendered for display, e.g. `"14:03:27"`.
    pub time: String,
}

impl MetricSnapshot {
    /// Builds a snapshot from a raw `metrics_update` payload.
    ///
    /// The source emits `{cpu_usage, memory_usage}` and omits or nulls a
    /// field when a probe misses, so decoding is lenient: anything that is
    /// not a number degrades to `0.0` rather than rejecting the snapshot.
    #[must_use]
    pub fn from_raw(raw: &Value, time: String) -> MetricSnapshot {
        MetricSnapshot {
            cpu_usage: numeric_field(raw, "cpu_usage"),
            memory_usage: numeric_field(raw, "memory_usage"),
            time,
        }
    }
}

fn numeric_field(raw: &Value, field: &str) -> f64 {
    raw.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Sliding window of the most recent metric snapshots, oldest first.
#[derive(Clone, Debug)]
pub struct MetricsHistory {
    /// Snapshots in receipt order: front = oldest, back = most recent.
    snapshots: VecDeque<MetricSnapshot>,
    /// Maximum number of snapshots retained.
    window_size: usize,
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new(METRICS_WINDOW_SIZE)
    }
}

impl MetricsHistory {
    /// Creates a history ring with a custom window size.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        MetricsHistory {
            snapshots: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Appends a snapshot, evicting the oldest once the window is full.
    pub fn record(&mut self, snapshot: MetricSnapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.window_size {
            self.snapshots.pop_front();
        }
    }

    /// Returns the retained snapshots, oldest first.
    #[must_use]
    pub fn window(&self) -> Vec<MetricSnapshot> {
        self.snapshots.iter().cloned().collect()
    }

    /// Returns the most recently recorded snapshot, or a zeroed default
    /// before any snapshot has arrived.
    #[must_use]
    pub fn current(&self) -> MetricSnapshot {
        self.snapshots.back().cloned().unwrap_or_default()
    }

    /// Number of snapshots currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True before the first snapshot arrives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
