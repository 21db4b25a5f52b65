//! Limits and sentinels for the log half of the pipeline.

/// Maximum number of canonical log records retained for display.
///
/// When a merged batch exceeds this size, entries past this position are
/// evicted. The bound keeps dashboard memory flat under sustained log volume.
pub const LOG_BUFFER_CAPACITY: usize = 100;

/// Message substituted when an inbound record carries no usable message.
pub const NO_MESSAGE_SENTINEL: &str = "no message";
