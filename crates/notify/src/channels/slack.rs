//! Slack-compatible incoming-webhook channel.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::NotifyChannel;

/// Retry-After fallback when Slack omits or mangles the header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Slack webhook notification channel.
pub struct SlackChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel with a specific webhook URL.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let payload = SlackPayload { text };

        debug!(channel = "slack", len = text.len(), "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ChannelError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();

        warn!(
            channel = "slack",
            status = %status,
            body = %body,
            "Slack webhook request failed"
        );

        Err(ChannelError::Status { status, body })
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_text_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({ "text": "pool switched" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let channel = SlackChannel::new(format!("{}/hook", server.uri()));
        channel.send("pool switched").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri());
        match channel.send("hello").await {
            Err(ChannelError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri());
        let err = channel.send("hello").await.unwrap_err();
        assert!(matches!(
            err,
            ChannelError::RateLimited {
                retry_after_secs: 12
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let channel = SlackChannel::new("http://127.0.0.1:9/hook");
        let err = channel.send("hello").await.unwrap_err();
        assert!(matches!(err, ChannelError::Http(_)));
    }
}
