//! Pool switch and in-request failover detection.

use chrono::Utc;
use notify::NotifyEvent;

/// Remembers which pool served the previous request.
#[derive(Debug, Default, Clone)]
pub struct PoolTracker {
    last_seen: Option<String>,
}

impl PoolTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool of the last observed request, `None` before the first one.
    #[must_use]
    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Check one request. Returns a failover event first, then a pool switch
    /// event, for whichever conditions hold. The first request only sets the
    /// baseline.
    pub fn observe(
        &mut self,
        pool: &str,
        upstreams: &[String],
        failover_in_request: bool,
    ) -> Vec<NotifyEvent> {
        let mut events = Vec::new();

        if failover_in_request {
            events.push(NotifyEvent::FailoverRequest {
                upstreams: upstreams.to_vec(),
                pool: pool.to_string(),
                timestamp: Utc::now(),
            });
        }

        if let Some(previous) = self.last_seen.as_deref() {
            if previous != pool {
                events.push(NotifyEvent::PoolSwitch {
                    from: previous.to_string(),
                    to: pool.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }

        self.last_seen = Some(pool.to_string());
        events
    }
}
