//! Alert event types raised by the access-log watcher.

use chrono::{DateTime, Utc};

/// Severity levels for alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something needs attention
    Warning,
    /// Immediate action required
    Critical,
}

impl Severity {
    /// Get display name for this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Closed set of alert categories. Cooldowns are tracked per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    ErrorRate,
    FailoverRequest,
    PoolSwitch,
}

impl AlertCategory {
    /// Log name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ErrorRate => "error_rate",
            Self::FailoverRequest => "failover_request",
            Self::PoolSwitch => "pool_switch",
        }
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that can trigger an alert.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyEvent {
    /// Share of 5xx-looking outcomes in the window reached the threshold
    ErrorRate {
        rate: f64,
        errors: usize,
        window: usize,
        threshold: f64,
        timestamp: DateTime<Utc>,
    },

    /// nginx tried more than one upstream for a single request
    FailoverRequest {
        upstreams: Vec<String>,
        pool: String,
        timestamp: DateTime<Utc>,
    },

    /// Traffic moved from one backend pool to another
    PoolSwitch {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },
}

impl NotifyEvent {
    /// Cooldown category of this event.
    #[must_use]
    pub const fn category(&self) -> AlertCategory {
        match self {
            Self::ErrorRate { .. } => AlertCategory::ErrorRate,
            Self::FailoverRequest { .. } => AlertCategory::FailoverRequest,
            Self::PoolSwitch { .. } => AlertCategory::PoolSwitch,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ErrorRate { .. } => Severity::Critical,
            Self::FailoverRequest { .. } | Self::PoolSwitch { .. } => Severity::Warning,
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::ErrorRate { .. } => "High Error Rate Alert".to_string(),
            Self::FailoverRequest { .. } => "Failover Detected in Request".to_string(),
            Self::PoolSwitch { .. } => "Pool Switch Detected".to_string(),
        }
    }

    /// When the condition was detected.
    #[must_use]
    pub const fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::ErrorRate { timestamp, .. }
            | Self::FailoverRequest { timestamp, .. }
            | Self::PoolSwitch { timestamp, .. } => timestamp,
        }
    }

    /// Render the Slack-markdown message body sent to the webhook.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ErrorRate {
                rate,
                errors,
                window,
                threshold,
                ..
            } => format!(
                // `{:?}` prints the threshold as configured: 2.0 stays "2.0", 2.25 stays "2.25"
                "⚠️ *{}*\nError Rate: {rate:.2}%\nErrors: {errors}/{window} requests\nThreshold: {threshold:?}%",
                self.title()
            ),

            Self::FailoverRequest {
                upstreams, pool, ..
            } => format!(
                "🔄 *{}*\nNginx tried multiple upstreams: {}\nFinal pool: {pool}",
                self.title(),
                upstreams.join(", ")
            ),

            Self::PoolSwitch { from, to, .. } => format!(
                "🔄 *{}*\nTraffic shifted: {from} → {to}\nPrimary pool may be down!",
                self.title()
            ),
        }
    }
}
