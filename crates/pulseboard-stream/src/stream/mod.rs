// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Push-stream subscription client.
//!
//! This module implements the client side of the dashboard's push transport:
//! a websocket connection delivering named events as JSON envelopes, one per
//! text frame:
//!
//! ```json
//! {"event": "metrics_update", "data": {"cpu_usage": 52.5, "memory_usage": 71.0}}
//! {"event": "log_update", "data": {"message": "oom", "severity": 2}}
//! ```
//!
//! The client registers one logical subscription covering both contractual
//! channels and forwards payloads to the owning services: `metrics_update`
//! snapshots are stamped with the receipt time and recorded into the metrics
//! history, `log_update` payloads are wrapped in a one-element batch and
//! appended to the log buffer. Malformed frames and payloads are dropped or
//! absorbed by the normalizers; they never crash the client.
//!
//! Teardown is driven by a [`CancellationToken`] and is idempotent: the
//! first cancellation sends a best-effort `unsubscribe` control frame and
//! stops the event loop, after which no further callbacks fire. Transport
//! disruption is reported on a [`ConnectionStatus`] broadcast rather than
//! surfaced as an error; reconnection policy belongs to the transport's
//! operator, not to this client.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::logs::buffer_service::LogBufferHandle;
use crate::metrics::history::MetricSnapshot;
use crate::metrics::history_service::MetricsHistoryHandle;

/// Channel carrying metric snapshot payloads.
pub const METRICS_UPDATE_EVENT: &str = "metrics_update";

/// Channel carrying raw log record payloads.
pub const LOG_UPDATE_EVENT: &str = "log_update";

/// Capacity of the connection status broadcast channel.
const STATUS_CHANNEL_CAPACITY: usize = 16;

/// Connectivity of the stream client, surfaced to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Subscription established, events flowing.
    Connected,
    /// The transport dropped the connection or failed; no reconnect is
    /// attempted here.
    Disconnected,
    /// The client was torn down via unsubscribe.
    Stopped,
}

/// Named-event envelope delivered by the push transport.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// FrameSource abstracts the transport delivering event frames.
enum FrameSource {
    /// Live websocket connection (default transport)
    WebSocket(Box<WsStream>),

    /// Replay source for testing - yields a fixed sequence of frames
    #[allow(dead_code)]
    Replay(VecDeque<String>),
}

impl FrameSource {
    /// Reads the next text frame. `Ok(None)` means the transport closed.
    async fn next_frame(&mut self) -> Result<Option<String>, StreamError> {
        match self {
            FrameSource::WebSocket(stream) => loop {
                match stream.next().await {
                    Some(Ok(WsMessage::Text(text))) => return Ok(Some(text)),
                    // Keepalive frames are answered by the stream itself
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Binary(_) | WsMessage::Frame(_))) => {
                        debug!("Ignoring non-text frame from stream transport");
                    }
                    Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
                    Some(Err(e)) => return Err(StreamError::Transport(e.to_string())),
                }
            },
            FrameSource::Replay(frames) => Ok(frames.pop_front()),
        }
    }

    /// Sends a subscribe/unsubscribe control frame to the transport.
    async fn send_control(&mut self, frame: String) -> Result<(), StreamError> {
        match self {
            FrameSource::WebSocket(stream) => stream
                .send(WsMessage::Text(frame))
                .await
                .map_err(|e| StreamError::Transport(e.to_string())),
            FrameSource::Replay(_) => Ok(()),
        }
    }
}

fn control_frame(kind: &str) -> String {
    serde_json::json!({
        "type": kind,
        "events": [METRICS_UPDATE_EVENT, LOG_UPDATE_EVENT],
    })
    .to_string()
}

// Outcome of one event-loop turn.
enum Turn {
    Cancelled,
    Frame(Result<Option<String>, StreamError>),
}

/// Client owning the subscription to the push transport.
///
/// Construction establishes the connection; [`StreamClient::spin`] runs the
/// event loop until the transport closes or the cancellation token fires.
/// The log buffer and metrics history are each owned by exactly one client;
/// nothing else mutates them directly.
pub struct StreamClient {
    source: FrameSource,
    logs: LogBufferHandle,
    metrics: MetricsHistoryHandle,
    clock: Arc<dyn Clock>,
    cancel_token: CancellationToken,
    status_tx: broadcast::Sender<ConnectionStatus>,
}

impl StreamClient {
    /// Connects to the push transport and prepares the subscription.
    ///
    /// Cancelling `cancel_token` unsubscribes; cancellation is idempotent.
    pub async fn connect(
        config: &StreamConfig,
        logs: LogBufferHandle,
        metrics: MetricsHistoryHandle,
        cancel_token: CancellationToken,
    ) -> Result<Self, StreamError> {
        let (stream, _) = connect_async(config.stream_url.as_str())
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        Ok(Self::from_source(
            FrameSource::WebSocket(Box::new(stream)),
            logs,
            metrics,
            Arc::new(SystemClock),
            cancel_token,
        ))
    }

    fn from_source(
        source: FrameSource,
        logs: LogBufferHandle,
        metrics: MetricsHistoryHandle,
        clock: Arc<dyn Clock>,
        cancel_token: CancellationToken,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            source,
            logs,
            metrics,
            clock,
            cancel_token,
            status_tx,
        }
    }

    /// Returns a receiver for connectivity status changes.
    #[must_use]
    pub fn status_receiver(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Runs the event loop until teardown or transport close.
    ///
    /// This is the only place pipeline state is mutated from: frames are
    /// dispatched one at a time, so `append`/`record` effects are atomic
    /// with respect to each other.
    pub async fn spin(mut self) {
        if let Err(e) = self.source.send_control(control_frame("subscribe")).await {
            error!("Failed to subscribe to stream channels: {e}");
            let _ = self.status_tx.send(ConnectionStatus::Disconnected);
            return;
        }
        let _ = self.status_tx.send(ConnectionStatus::Connected);

        let cancel_token = self.cancel_token.clone();
        loop {
            let turn = if cancel_token.is_cancelled() {
                Turn::Cancelled
            } else {
                tokio::select! {
                    () = cancel_token.cancelled() => Turn::Cancelled,
                    frame = self.source.next_frame() => Turn::Frame(frame),
                }
            };

            match turn {
                Turn::Cancelled => {
                    // Best-effort: release the transport-level listener so no
                    // further events are delivered for this subscription.
                    if let Err(e) = self.source.send_control(control_frame("unsubscribe")).await {
                        debug!("Unsubscribe frame not delivered: {e}");
                    }
                    let _ = self.status_tx.send(ConnectionStatus::Stopped);
                    break;
                }
                Turn::Frame(Ok(Some(text))) => self.dispatch(&text),
                Turn::Frame(Ok(None)) => {
                    warn!("Stream transport closed by peer");
                    let _ = self.status_tx.send(ConnectionStatus::Disconnected);
                    break;
                }
                Turn::Frame(Err(e)) => {
                    error!("Stream transport error: {e}");
                    let _ = self.status_tx.send(ConnectionStatus::Disconnected);
                    break;
                }
            }
        }
    }

    fn dispatch(&self, text: &str) {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("Dropping malformed stream frame: {e}");
                return;
            }
        };

        match envelope.event.as_str() {
            METRICS_UPDATE_EVENT => {
                let snapshot =
                    MetricSnapshot::from_raw(&envelope.data, self.clock.local_time_display());
                if self.metrics.record(snapshot).is_err() {
                    warn!("Metrics history service is gone, dropping snapshot");
                }
            }
            LOG_UPDATE_EVENT => {
                if self.logs.append(vec![envelope.data]).is_err() {
                    warn!("Log buffer service is gone, dropping log record");
                }
            }
            other => debug!("Ignoring unrecognized stream event '{other}'"),
        }
    }
}
