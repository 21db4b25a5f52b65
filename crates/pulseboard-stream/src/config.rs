// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::StreamError;
use std::env;

use crate::logs::constants::LOG_BUFFER_CAPACITY;
use crate::metrics::constants::METRICS_WINDOW_SIZE;

/// Configuration for the stream ingestion pipeline
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Websocket URL of the push transport (e.g. "ws://127.0.0.1:4999/stream")
    pub stream_url: String,
    /// Log level (e.g. trace, debug, info, warn, error)
    pub log_level: String,
    /// Maximum number of canonical log records retained for display
    pub log_buffer_capacity: usize,
    /// Number of metric snapshots retained in the history ring
    pub metrics_window: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            stream_url: "ws://127.0.0.1:4999/stream".to_string(),
            log_level: "info".to_string(),
            log_buffer_capacity: LOG_BUFFER_CAPACITY,
            metrics_window: METRICS_WINDOW_SIZE,
        }
    }
}

impl StreamConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, StreamError> {
        let defaults = Self::default();

        let stream_url = env::var("PULSEBOARD_STREAM_URL").unwrap_or(defaults.stream_url);
        let log_level = env::var("PULSEBOARD_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);
        let log_buffer_capacity = env::var("PULSEBOARD_LOG_BUFFER_CAPACITY")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.log_buffer_capacity);
        let metrics_window = env::var("PULSEBOARD_METRICS_WINDOW")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.metrics_window);

        let config = Self {
            stream_url,
            log_level,
            log_buffer_capacity,
            metrics_window,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.stream_url.trim().is_empty() {
            return Err(StreamError::InvalidConfig(
                "PULSEBOARD_STREAM_URL cannot be empty".to_string(),
            ));
        }

        if !self.stream_url.starts_with("ws://") && !self.stream_url.starts_with("wss://") {
            return Err(StreamError::InvalidConfig(format!(
                "Invalid stream URL '{}'. Must use the ws:// or wss:// scheme",
                self.stream_url
            )));
        }

        if self.log_buffer_capacity == 0 {
            return Err(StreamError::InvalidConfig(
                "Log buffer capacity must be greater than 0".to_string(),
            ));
        }

        if self.metrics_window == 0 {
            return Err(StreamError::InvalidConfig(
                "Metrics window must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(StreamError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StreamConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_buffer_capacity, 100);
        assert_eq!(config.metrics_window, 20);
    }

    #[test]
    fn test_validate_empty_url() {
        let config = StreamConfig {
            stream_url: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_non_websocket_url() {
        let config = StreamConfig {
            stream_url: "http://127.0.0.1:4999".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = StreamConfig {
            log_buffer_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StreamConfig {
            metrics_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = StreamConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let config = StreamConfig {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(
                config.validate().is_ok(),
                "Log level '{}' should be valid",
                level
            );
        }
    }

    #[test]
    fn test_wss_url_is_valid() {
        let config = StreamConfig {
            stream_url: "wss://telemetry.example.com/stream".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
