// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use pulseboard_stream::clock::SystemClock;
use pulseboard_stream::config::StreamConfig;
use pulseboard_stream::logs::buffer_service::{LogBufferHandle, LogBufferService};
use pulseboard_stream::metrics::history_service::{MetricsHistoryHandle, MetricsHistoryService};
use pulseboard_stream::stream::{ConnectionStatus, StreamClient};

const RENDER_INTERVAL: Duration = Duration::from_secs(2);
const RENDERED_LOG_LINES: usize = 10;

#[tokio::main]
pub async fn main() {
    let config = match StreamConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating config on dashboard startup: {e}");
            return;
        }
    };

    let env_filter = format!("tungstenite=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");
    info!("Connecting to telemetry stream at {}", config.stream_url);

    let (logs, metrics) = start_services(&config);
    let cancel_token = CancellationToken::new();

    let client = match StreamClient::connect(
        &config,
        logs.clone(),
        metrics.clone(),
        cancel_token.clone(),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to reach the telemetry stream: {e}");
            return;
        }
    };

    let mut status_rx = client.status_receiver();
    tokio::spawn(client.spin());

    let mut render_interval = interval(RENDER_INTERVAL);
    render_interval.tick().await; // discard first tick, which is instantaneous

    loop {
        tokio::select! {
            _ = render_interval.tick() => {
                render(&logs, &metrics).await;
            }
            status = status_rx.recv() => {
                match status {
                    Ok(ConnectionStatus::Connected) => info!("Stream connected"),
                    Ok(ConnectionStatus::Disconnected) => {
                        warn!("Stream disconnected, exiting");
                        break;
                    }
                    Ok(ConnectionStatus::Stopped) | Err(_) => break,
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Unable to listen for shutdown signal: {e}");
                }
                info!("Shutting down");
                cancel_token.cancel();
                break;
            }
        }
    }

    cancel_token.cancel();
    let _ = logs.shutdown();
    let _ = metrics.shutdown();
}

fn start_services(config: &StreamConfig) -> (LogBufferHandle, MetricsHistoryHandle) {
    let (log_service, logs) =
        LogBufferService::new(config.log_buffer_capacity, Arc::new(SystemClock));
    let (metrics_service, metrics) = MetricsHistoryService::new(config.metrics_window);

    tokio::spawn(log_service.run());
    tokio::spawn(metrics_service.run());

    (logs, metrics)
}

// Plain-text stand-in for the dashboard's rendering layer: a read-only view
// over the current metrics and the most recent log records.
async fn render(logs: &LogBufferHandle, metrics: &MetricsHistoryHandle) {
    let current = match metrics.current().await {
        Ok(current) => current,
        Err(e) => {
            warn!("Metrics view unavailable: {e}");
            return;
        }
    };
    let records = match logs.snapshot().await {
        Ok(records) => records,
        Err(e) => {
            warn!("Log view unavailable: {e}");
            return;
        }
    };

    info!(
        "cpu: {:.1}% | memory: {:.1}% | as of: {} | logs retained: {}",
        current.cpu_usage,
        current.memory_usage,
        if current.time.is_empty() {
            "-"
        } else {
            current.time.as_str()
        },
        records.len(),
    );

    for record in records.iter().take(RENDERED_LOG_LINES) {
        info!(
            "  {} [{}] {}",
            record.timestamp.to_rfc3339(),
            record.severity,
            record.message
        );
    }
}
