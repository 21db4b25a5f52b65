//! Actor shell around [`LogBuffer`] for single-owner mutation.
//!
//! The service task owns the buffer; producers hold cloneable
//! [`LogBufferHandle`]s and send commands over a channel. All mutation
//! happens on the service task, so `append` calls are applied atomically
//! with respect to each other and to reads, without locks.
//!
//! ```text
//!   StreamClient / renderer
//!          │ commands via channel
//!          v
//!   ┌───────────────────┐
//!   │ LogBufferService  │  (single consumer, owns LogBuffer)
//!   └───────────────────┘
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::clock::Clock;
use crate::logs::buffer::LogBuffer;
use crate::logs::record::LogRecord;

/// Commands accepted by the log buffer service.
#[derive(Debug)]
pub enum LogBufferCommand {
    /// Normalize and merge a batch of raw payloads.
    Append(Vec<Value>),
    /// Read the retained records, most recently delivered first.
    Snapshot(oneshot::Sender<Vec<LogRecord>>),
    /// Stop the service after draining queued commands.
    Shutdown,
}

/// Cloneable handle for sending commands to the log buffer service.
#[derive(Clone, Debug)]
pub struct LogBufferHandle {
    tx: mpsc::UnboundedSender<LogBufferCommand>,
}

impl LogBufferHandle {
    /// Queues a batch of raw payloads for normalization and merge.
    ///
    /// Non-blocking; returns an error only when the service has shut down.
    pub fn append(
        &self,
        batch: Vec<Value>,
    ) -> Result<(), mpsc::error::SendError<LogBufferCommand>> {
        self.tx.send(LogBufferCommand::Append(batch))
    }

    /// Reads the retained records, most recently delivered first.
    pub async fn snapshot(&self) -> Result<Vec<LogRecord>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(LogBufferCommand::Snapshot(response_tx))
            .map_err(|e| format!("Failed to send snapshot command: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive snapshot response: {e}"))
    }

    /// Stops the service after queued commands are drained.
    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<LogBufferCommand>> {
        self.tx.send(LogBufferCommand::Shutdown)
    }
}

/// Service task that owns the log buffer and processes commands.
pub struct LogBufferService {
    buffer: LogBuffer,
    rx: mpsc::UnboundedReceiver<LogBufferCommand>,
}

impl LogBufferService {
    /// Creates a service with the standard display capacity and system clock.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> (Self, LogBufferHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            buffer: LogBuffer::default(),
            rx,
        };
        (service, LogBufferHandle { tx })
    }

    /// Creates a service with a custom capacity and clock.
    #[must_use]
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> (Self, LogBufferHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            buffer: LogBuffer::new(capacity, clock),
            rx,
        };
        (service, LogBufferHandle { tx })
    }

    /// Processes commands until shutdown or until all handles are dropped.
    pub async fn run(mut self) {
        debug!("Log buffer service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                LogBufferCommand::Append(batch) => {
                    self.buffer.append(&batch);
                }
                LogBufferCommand::Snapshot(response_tx) => {
                    if response_tx.send(self.buffer.snapshot()).is_err() {
                        error!("Failed to send snapshot response - receiver dropped");
                    }
                }
                LogBufferCommand::Shutdown => {
                    self.drain();
                    debug!("Log buffer service shutting down");
                    break;
                }
            }
        }
    }

    // Commands already queued at shutdown are still applied; a batch that
    // made it into the channel is never lost.
    fn drain(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            match command {
                LogBufferCommand::Append(batch) => self.buffer.append(&batch),
                LogBufferCommand::Snapshot(response_tx) => {
                    let _ = response_tx.send(self.buffer.snapshot());
                }
                LogBufferCommand::Shutdown => {}
            }
        }
    }
}
