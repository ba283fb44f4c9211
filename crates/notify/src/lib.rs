//! Alert delivery for the blue/green access-log watcher.
//!
//! Detectors hand a rendered message and its [`AlertCategory`] to the
//! [`Notifier`]. The notifier drops repeats that fall inside the category's
//! cooldown, delivers everything else to its channels under a bounded timeout,
//! and logs the outcome. Delivery errors never reach the caller.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use notify::{NotifyChannel, NotifyEvent, Notifier, SlackChannel};
//!
//! # async fn run() {
//! let slack: Arc<dyn NotifyChannel> =
//!     Arc::new(SlackChannel::new("https://hooks.slack.com/services/T/B/X"));
//! let mut notifier = Notifier::with_channels(
//!     vec![slack],
//!     Duration::from_secs(300),
//!     Duration::from_secs(5),
//! );
//!
//! let event = NotifyEvent::PoolSwitch {
//!     from: "blue".to_string(),
//!     to: "green".to_string(),
//!     timestamp: chrono::Utc::now(),
//! };
//! notifier.notify(event.category(), &event.message()).await;
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for transports
//! - [`SlackChannel`] posts `{"text": ...}` to an incoming webhook
//! - [`CooldownGate`] holds the per-category last-send table
//! - [`Notifier`] combines the gate with the channels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;
pub mod gate;

pub use channels::slack::SlackChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use events::{AlertCategory, NotifyEvent, Severity};
pub use gate::CooldownGate;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// What happened to a single `notify` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every channel accepted the message
    Sent,
    /// At least one channel failed; the cooldown still started
    Failed,
    /// Dropped because the category is cooling down
    Suppressed,
    /// Alerting is off or no channel is configured
    Disabled,
}

/// Cooldown-gated alert dispatcher.
///
/// Owned by a single consumer; `notify` takes `&mut self` so the cooldown
/// table never needs a lock.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    gate: CooldownGate,
    timeout: Duration,
    disabled: bool,
}

impl Notifier {
    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(
        channels: Vec<Arc<dyn NotifyChannel>>,
        cooldown: Duration,
        timeout: Duration,
    ) -> Self {
        if channels.is_empty() {
            warn!("No notification channels configured");
        } else {
            info!(
                channel_count = channels.len(),
                cooldown_secs = cooldown.as_secs(),
                "Notification system initialized"
            );
        }

        Self {
            channels,
            gate: CooldownGate::new(cooldown),
            timeout,
            disabled: false,
        }
    }

    /// Create a disabled notifier (alerting turned off).
    #[must_use]
    pub fn disabled(cooldown: Duration) -> Self {
        Self {
            channels: vec![],
            gate: CooldownGate::new(cooldown),
            timeout: Duration::ZERO,
            disabled: true,
        }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    /// Get the number of enabled channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.channels.len()
        }
    }

    #[must_use]
    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    /// Deliver `message` unless `category` is still cooling down.
    ///
    /// The cooldown restarts on every attempt, successful or not. Errors are
    /// logged here and never returned.
    pub async fn notify(&mut self, category: AlertCategory, message: &str) -> Delivery {
        if !self.has_channels() {
            debug!(category = %category, "Alerting disabled, skipping alert");
            return Delivery::Disabled;
        }

        let now = Instant::now();
        if self.gate.is_cooling_down(category, now) {
            debug!(category = %category, "Alert suppressed by cooldown");
            return Delivery::Suppressed;
        }

        let mut delivered = true;
        for channel in &self.channels {
            let channel_name = channel.name();
            let result = match tokio::time::timeout(self.timeout, channel.send(message)).await {
                Ok(result) => result,
                Err(_) => Err(ChannelError::Timeout(self.timeout)),
            };

            match result {
                Ok(()) => {
                    info!(channel = channel_name, category = %category, "Alert sent");
                }
                Err(e) => {
                    delivered = false;
                    error!(
                        channel = channel_name,
                        category = %category,
                        error = %e,
                        "Failed to send alert"
                    );
                }
            }
        }

        self.gate.record(category, now);

        if delivered {
            Delivery::Sent
        } else {
            Delivery::Failed
        }
    }
}
