//! Limits for the metrics history ring.

/// Number of snapshots retained in the history ring.
///
/// Once the ring is full the oldest snapshot is evicted for each new one, so
/// the chart window slides forward in time at the push cadence of the source.
pub const METRICS_WINDOW_SIZE: usize = 20;
