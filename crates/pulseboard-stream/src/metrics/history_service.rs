//! Actor shell around [`MetricsHistory`], mirroring the log buffer service.
//!
//! The service task owns the ring; the stream client records snapshots and
//! the rendering layer reads the window and the current snapshot through
//! cloneable handles. Sequential command processing keeps every `record`
//! atomic with respect to reads.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::metrics::history::{MetricSnapshot, MetricsHistory};

/// Commands accepted by the metrics history service.
#[derive(Debug)]
pub enum MetricsHistoryCommand {
    /// Append a snapshot to the ring.
    Record(MetricSnapshot),
    /// Read the retained snapshots, oldest first.
    Window(oneshot::Sender<Vec<MetricSnapshot>>),
    /// Read the most recent snapshot (zeroed default before the first).
    Current(oneshot::Sender<MetricSnapshot>),
    /// Stop the service after draining queued commands.
    Shutdown,
}

/// Cloneable handle for sending commands to the metrics history service.
#[derive(Clone, Debug)]
pub struct MetricsHistoryHandle {
    tx: mpsc::UnboundedSender<MetricsHistoryCommand>,
}

impl MetricsHistoryHandle {
    /// Queues a snapshot for the ring. Non-blocking.
    pub fn record(
        &self,
        snapshot: MetricSnapshot,
    ) -> Result<(), mpsc::error::SendError<MetricsHistoryCommand>> {
        self.tx.send(MetricsHistoryCommand::Record(snapshot))
    }

    /// Reads the retained snapshots, oldest first.
    pub async fn window(&self) -> Result<Vec<MetricSnapshot>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(MetricsHistoryCommand::Window(response_tx))
            .map_err(|e| format!("Failed to send window command: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive window response: {e}"))
    }

    /// Reads the most recent snapshot.
    pub async fn current(&self) -> Result<MetricSnapshot, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(MetricsHistoryCommand::Current(response_tx))
            .map_err(|e| format!("Failed to send current command: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive current response: {e}"))
    }

    /// Stops the service after queued commands are drained.
    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<MetricsHistoryCommand>> {
        self.tx.send(MetricsHistoryCommand::Shutdown)
    }
}

/// Service task that owns the metrics history and processes commands.
pub struct MetricsHistoryService {
    history: MetricsHistory,
    rx: mpsc::UnboundedReceiver<MetricsHistoryCommand>,
}

impl MetricsHistoryService {
    /// Creates a service with the standard window size.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> (Self, MetricsHistoryHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            history: MetricsHistory::default(),
            rx,
        };
        (service, MetricsHistoryHandle { tx })
    }

    /// Creates a service with a custom window size.
    #[must_use]
    pub fn new(window_size: usize) -> (Self, MetricsHistoryHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            history: MetricsHistory::new(window_size),
            rx,
        };
        (service, MetricsHistoryHandle { tx })
    }

    /// Processes commands until shutdown or until all handles are dropped.
    pub async fn run(mut self) {
        debug!("Metrics history service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                MetricsHistoryCommand::Record(snapshot) => {
                    self.history.record(snapshot);
                }
                MetricsHistoryCommand::Window(response_tx) => {
                    if response_tx.send(self.history.window()).is_err() {
                        error!("Failed to send window response - receiver dropped");
                    }
                }
                MetricsHistoryCommand::Current(response_tx) => {
                    if response_tx.send(self.history.current()).is_err() {
                        error!("Failed to send current response - receiver dropped");
                    }
                }
                MetricsHistoryCommand::Shutdown => {
                    self.drain();
                    debug!("Metrics history service shutting down");
                    break;
                }
            }
        }
    }

    // Snapshots already queued at shutdown are still applied.
    fn drain(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            match command {
                MetricsHistoryCommand::Record(snapshot) => self.history.record(snapshot),
                MetricsHistoryCommand::Window(response_tx) => {
                    let _ = response_tx.send(self.history.window());
                }
                MetricsHistoryCommand::Current(response_tx) => {
                    let _ = response_tx.send(self.history.current());
                }
                MetricsHistoryCommand::Shutdown => {}
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spawn_default_service() -> MetricsHistoryHandle {
        let (service, handle) = MetricsHistoryService::default();
        tokio::spawn(service.run());
        handle
    }

    fn snapshot(cpu: f64, label: &str) -> MetricSnapshot {
        MetricSnapshot {
            cpu_usage: cpu,
            memory_usage: 70.0,
            time: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_then_window() {
        let handle = spawn_default_service();

        handle.record(snapshot(50.0, "10:00:00")).unwrap();
        handle.record(snapshot(60.0, "10:00:01")).unwrap();

        let window = handle.window().await.unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].cpu_usage, 50.0);
        assert_eq!(window[1].cpu_usage, 60.0);

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_current_default_before_first_snapshot() {
        let handle = spawn_default_service();

        let current = handle.current().await.unwrap();
        assert_eq!(current, MetricSnapshot::default());

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_twenty_one_records_slide_the_window() {
        let handle = spawn_default_service();

        for i in 0..21 {
            handle
                .record(snapshot(f64::from(i), &format!("t{i}")))
                .unwrap();
        }

        let window = handle.window().await.unwrap();
        assert_eq!(window.len(), 20);
        assert_eq!(window[0].time, "t1");

        let current = handle.current().await.unwrap();
        assert_eq!(current.time, "t20");

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown() {
        let (service, handle) = MetricsHistoryService::default();
        let service_task = tokio::spawn(service.run());

        handle.shutdown().unwrap();
        service_task.await.unwrap();

        assert!(handle.record(snapshot(1.0, "x")).is_err());
        assert!(handle.window().await.is_err());
    }
}
