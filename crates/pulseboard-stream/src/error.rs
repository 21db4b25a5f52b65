// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when configuring or running the stream pipeline
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}
