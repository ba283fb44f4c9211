//! Error types for alert delivery.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when delivering an alert to a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("webhook returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Delivery did not finish within the configured bound
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}
