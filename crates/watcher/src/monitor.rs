//! Per-line pipeline: parse, update state, detect, alert.

use notify::{Delivery, Notifier, NotifyEvent};
use tracing::{debug, warn};

use crate::config::WatcherConfig;
use crate::detect::{ErrorRateDetector, PoolTracker};
use crate::parser::{parse_line, LogRecord};
use crate::window::SlidingWindow;

/// Running counters, mostly for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    pub lines: u64,
    pub records: u64,
    pub alerts_raised: u64,
    pub alerts_sent: u64,
}

/// Owns all mutable watcher state. Drive it from a single task.
pub struct Monitor {
    window: SlidingWindow,
    error_rate: ErrorRateDetector,
    pools: PoolTracker,
    notifier: Notifier,
    stats: MonitorStats,
}

impl Monitor {
    #[must_use]
    pub fn new(config: &WatcherConfig, notifier: Notifier) -> Self {
        Self {
            window: SlidingWindow::new(config.window_size),
            error_rate: ErrorRateDetector::new(config.error_rate_threshold),
            pools: PoolTracker::new(),
            notifier,
            stats: MonitorStats::default(),
        }
    }

    #[must_use]
    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    #[must_use]
    pub fn last_pool(&self) -> Option<&str> {
        self.pools.last_seen()
    }

    #[must_use]
    pub const fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Handle one raw log line. Returns the parsed record, or `None` for
    /// lines without routing fields.
    pub async fn process_line(&mut self, line: &str) -> Option<LogRecord> {
        self.stats.lines += 1;

        let record = parse_line(line)?;
        self.stats.records += 1;

        if let Some(status) = record.final_status() {
            self.window.record(status);
        }

        let events = self.pools.observe(
            &record.pool,
            &record.upstreams,
            record.failover_detected,
        );
        for event in events {
            self.raise(event).await;
        }

        if let Some(event) = self.error_rate.evaluate(&self.window) {
            self.raise(event).await;
        }

        debug!(
            pool = %record.pool,
            release = %record.release,
            window = self.window.len(),
            "Processed access log record"
        );

        Some(record)
    }

    async fn raise(&mut self, event: NotifyEvent) {
        self.stats.alerts_raised += 1;

        let category = event.category();
        warn!(
            category = %category,
            severity = event.severity().as_str(),
            detected_at = %event.timestamp(),
            "{}",
            event.title()
        );

        if self.notifier.notify(category, &event.message()).await == Delivery::Sent {
            self.stats.alerts_sent += 1;
        }
    }
}
