//! Notification channel implementations.

pub mod slack;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Trait for alert transports (Slack-compatible webhooks, test doubles, ...).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver a rendered alert message.
    async fn send(&self, text: &str) -> Result<(), ChannelError>;
}
