//! # Pulseboard Stream
//!
//! Stream-ingestion and state-normalization pipeline for the pulseboard live
//! telemetry dashboard. The crate receives a continuous push stream of metric
//! snapshots and log records, normalizes the loosely-structured payloads into
//! canonical shapes, deduplicates overlapping records, and maintains bounded,
//! time-ordered buffers suitable for display.
//!
//! ## Architecture
//!
//! ```text
//!    Push transport (websocket)
//!             │
//!             v
//!      ┌─────────────┐
//!      │ StreamClient │  (subscribes to metrics_update / log_update)
//!      └──────┬──────┘
//!        │         │
//!        v         v
//!  ┌───────────┐ ┌────────────────┐
//!  │ LogBuffer │ │ MetricsHistory │  (actor services, bounded state)
//!  └───────────┘ └────────────────┘
//! ```
//!
//! The rendering layer is an external consumer: it reads
//! [`logs::buffer_service::LogBufferHandle::snapshot`],
//! [`metrics::history_service::MetricsHistoryHandle::window`] and
//! [`metrics::history_service::MetricsHistoryHandle::current`] as read-only
//! views and never mutates pipeline state directly.

#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]

/// Injectable wall-clock capability used for timestamp defaults.
pub mod clock;

/// Environment-driven configuration with validation.
pub mod config;

/// Error types shared across the pipeline.
pub mod error;

/// Log record normalization and the bounded, deduplicated log buffer.
pub mod logs;

/// Metric snapshots and the fixed-length metrics history ring.
pub mod metrics;

/// Push-stream subscription client and channel dispatch.
pub mod stream;
