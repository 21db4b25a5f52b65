//! Bounded, deduplicated buffer of canonical log records.
//!
//! The buffer holds the most recently delivered records, newest first.
//! `append` takes a batch of raw payloads, normalizes every item, merges the
//! batch ahead of the existing entries, collapses duplicates by
//! `(timestamp, message)` and truncates to capacity.
//!
//! # Ordering
//!
//! The result order is "most recently delivered first", not chronological by
//! timestamp: display order tracks arrival order, and a duplicate collapses
//! to its earliest-seen position in the merged new-then-old sequence. Within
//! one channel the transport preserves delivery order, which is what the
//! merge relies on.
//!
//! # Memory
//!
//! At most [`LOG_BUFFER_CAPACITY`] records are retained; entries past the
//! capacity are evicted on merge. Entries are never mutated after insertion.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::logs::constants::LOG_BUFFER_CAPACITY;
use crate::logs::record::LogRecord;

/// Ordered, deduplicated, size-capped collection of canonical log records.
#[derive(Clone)]
pub struct LogBuffer {
    /// Records in display order: front = most recently delivered.
    records: VecDeque<LogRecord>,
    /// Maximum number of records retained.
    capacity: usize,
    /// Clock used for normalization-time defaults.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("records", &self.records)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_BUFFER_CAPACITY, Arc::new(SystemClock))
    }
}

impl LogBuffer {
    /// Creates a buffer with a custom capacity and clock.
    ///
    /// For production use prefer [`LogBuffer::default()`], which applies the
    /// standard display capacity and the system clock.
    #[must_use]
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        LogBuffer {
            records: VecDeque::with_capacity(capacity),
            capacity,
            clock,
        }
    }

    /// Normalizes and merges a batch of raw payloads into the buffer.
    ///
    /// The batch is normalized item by item (batch order preserved) and
    /// placed ahead of the existing records. Duplicates by
    /// `(timestamp, message)` keep their first occurrence in the merged
    /// new-then-old order. Anything past capacity is evicted.
    pub fn append(&mut self, batch: &[Value]) {
        let mut merged: VecDeque<LogRecord> = VecDeque::with_capacity(self.records.len());
        let mut seen: HashSet<(DateTime<Utc>, String)> = HashSet::new();

        for raw in batch {
            let record = LogRecord::normalize(raw, self.clock.as_ref());
            if seen.insert((record.timestamp, record.message.clone())) {
                merged.push_back(record);
            }
        }

        for record in self.records.drain(..) {
            if seen.insert((record.timestamp, record.message.clone())) {
                merged.push_back(record);
            }
        }

        if merged.len() > self.capacity {
            warn!(
                "Log buffer over capacity ({} records), evicting {} oldest",
                self.capacity,
                merged.len() - self.capacity
            );
            merged.truncate(self.capacity);
        }

        self.records = merged;
    }

    /// Returns the retained records, most recently delivered first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records.iter().cloned().collect()
    }

    /// Number of records currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
