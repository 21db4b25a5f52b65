//! Log ingestion and normalization for the live dashboard.
//!
//! This module implements the log half of the pipeline:
//!
//! ```text
//!     Raw log payload (string or object)
//!              │
//!              v
//!       ┌─────────────┐
//!       │ Normalizer  │  (decode, defaults, severity mapping)
//!       └──────┬──────┘
//!              │
//!              v
//!       ┌─────────────┐
//!       │  LogBuffer  │  (dedup by (timestamp, message), cap 100)
//!       └─────────────┘
//! ```
//!
//! Every record held by the buffer is fully normalized; raw or partial
//! records are never stored. Per-record failures (undecodable text, missing
//! fields, unrecognized severity values) are absorbed inside the normalizer
//! so one malformed event never drops or corrupts the rest of a batch.

pub mod buffer;
pub mod buffer_service;
pub mod constants;
pub mod record;
pub mod severity;
