//! Wall-clock access behind a seam so normalization stays deterministic in
//! tests.
//!
//! The pipeline reads the ambient clock in two places: stamping a default
//! timestamp on log records that arrive without one, and tagging metric
//! snapshots with a display-formatted receipt time. Both go through [`Clock`]
//! rather than calling `Utc::now()`/`Local::now()` directly.

use chrono::{DateTime, Local, Utc};

/// Display format for metric receipt times, local wall clock.
const DISPLAY_TIME_FORMAT: &str = "%H:%M:%S";

/// Source of "now" for the ingestion pipeline.
pub trait Clock: Send + Sync {
    /// Current instant, UTC. Used for log record timestamp defaults.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current local time rendered for display, e.g. `"14:03:27"`. Used to
    /// tag metric snapshots at receipt.
    fn local_time_display(&self) -> String;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_time_display(&self) -> String {
        Local::now().format(DISPLAY_TIME_FORMAT).to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_display_format() {
        let display = SystemClock.local_time_display();
        // HH:MM:SS
        assert_eq!(display.len(), 8);
        assert_eq!(display.matches(':').count(), 2);
    }

    #[test]
    fn test_system_clock_advances() {
        let a = SystemClock.now_utc();
        let b = SystemClock.now_utc();
        assert!(b >= a);
    }
}
