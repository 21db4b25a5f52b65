//! Metric snapshot ingestion for the live dashboard.
//!
//! Inbound `metrics_update` payloads carry point-in-time CPU and memory
//! percentages. Each one is tagged with a display-formatted receipt time and
//! appended to a fixed-length, time-ordered ring ([`history::MetricsHistory`])
//! that the rendering layer reads oldest-first for charting. The most recent
//! snapshot is also exposed on its own for the "current metrics" panel.

pub mod constants;
pub mod history;
pub mod history_service;
