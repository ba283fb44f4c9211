//! Per-category alert cooldown.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::events::AlertCategory;

/// Remembers when each alert category last went out and refuses repeats
/// inside the cooldown window.
#[derive(Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    last_sent: HashMap<AlertCategory, Instant>,
}

impl CooldownGate {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: HashMap::new(),
        }
    }

    /// True when `category` fired less than `cooldown` before `now`.
    #[must_use]
    pub fn is_cooling_down(&self, category: AlertCategory, now: Instant) -> bool {
        self.last_sent
            .get(&category)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.cooldown)
    }

    /// Start a fresh cooldown window for `category`.
    pub fn record(&mut self, category: AlertCategory, now: Instant) {
        self.last_sent.insert(category, now);
    }

    /// Time of the last recorded send for `category`.
    #[must_use]
    pub fn last_sent(&self, category: AlertCategory) -> Option<Instant> {
        self.last_sent.get(&category).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_alert_is_never_cooling_down() {
        let gate = CooldownGate::new(Duration::from_secs(300));
        assert!(!gate.is_cooling_down(AlertCategory::ErrorRate, Instant::now()));
        assert!(gate.last_sent(AlertCategory::ErrorRate).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expires() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        gate.record(AlertCategory::PoolSwitch, Instant::now());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(gate.is_cooling_down(AlertCategory::PoolSwitch, Instant::now()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!gate.is_cooling_down(AlertCategory::PoolSwitch, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_are_independent() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        gate.record(AlertCategory::FailoverRequest, Instant::now());

        assert!(gate.is_cooling_down(AlertCategory::FailoverRequest, Instant::now()));
        assert!(!gate.is_cooling_down(AlertCategory::PoolSwitch, Instant::now()));
        assert!(!gate.is_cooling_down(AlertCategory::ErrorRate, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cooldown_never_suppresses() {
        let mut gate = CooldownGate::new(Duration::ZERO);
        gate.record(AlertCategory::ErrorRate, Instant::now());
        assert!(!gate.is_cooling_down(AlertCategory::ErrorRate, Instant::now()));
    }
}
