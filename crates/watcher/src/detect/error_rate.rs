//! Error-rate detection over the sliding window.

use chrono::Utc;
use notify::NotifyEvent;

use crate::window::SlidingWindow;

/// Below this many outcomes the ratio is too noisy to alert on.
pub const MIN_SAMPLES: usize = 10;

/// Fires while the share of error outcomes in the window is at or above the
/// threshold. Repeats are left to the notifier's cooldown.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRateDetector {
    threshold: f64,
}

impl ErrorRateDetector {
    /// `threshold` is a percentage, e.g. `2.0` for 2%.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, window: &SlidingWindow) -> Option<NotifyEvent> {
        let total = window.len();
        if total < MIN_SAMPLES {
            return None;
        }

        let errors = window.iter().filter(|status| is_error(status)).count();
        let rate = errors as f64 * 100.0 / total as f64;

        (rate >= self.threshold).then(|| NotifyEvent::ErrorRate {
            rate,
            errors,
            window: total,
            threshold: self.threshold,
            timestamp: Utc::now(),
        })
    }
}

/// Any status containing a `5` counts. Deliberately loose: it matches every
/// 5xx code and also anything else with a 5 in it.
fn is_error(status: &str) -> bool {
    status.contains('5')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(statuses: &[&str]) -> SlidingWindow {
        let mut window = SlidingWindow::new(200);
        for status in statuses {
            window.record(*status);
        }
        window
    }

    #[test]
    fn test_quiet_below_min_samples() {
        let window = window_of(&["502"; 9]);
        assert!(ErrorRateDetector::new(2.0).evaluate(&window).is_none());
    }

    #[test]
    fn test_fires_at_min_samples() {
        let window = window_of(&["500"; 10]);
        let event = ErrorRateDetector::new(2.0).evaluate(&window).unwrap();
        match event {
            NotifyEvent::ErrorRate {
                rate,
                errors,
                window,
                ..
            } => {
                assert!((rate - 100.0).abs() < f64::EPSILON);
                assert_eq!(errors, 10);
                assert_eq!(window, 10);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let mut statuses = vec!["200"; 195];
        statuses.extend(["502", "503", "500", "504", "502"]);
        let window = window_of(&statuses);

        let event = ErrorRateDetector::new(2.0).evaluate(&window);
        assert!(matches!(
            event,
            Some(NotifyEvent::ErrorRate { errors: 5, window: 200, .. })
        ));
        assert!(ErrorRateDetector::new(3.0).evaluate(&window).is_none());
        // exactly at the threshold still fires
        assert!(ErrorRateDetector::new(2.5).evaluate(&window).is_some());
    }

    #[test]
    fn test_any_five_counts_as_error() {
        let window = window_of(&[
            "200", "200", "200", "200", "200", "200", "200", "200", "250", "405",
        ]);
        let event = ErrorRateDetector::new(20.0).evaluate(&window);
        assert!(matches!(event, Some(NotifyEvent::ErrorRate { errors: 2, .. })));
    }

    #[test]
    fn test_healthy_window_is_quiet() {
        let window = window_of(&["200"; 50]);
        assert!(ErrorRateDetector::new(2.0).evaluate(&window).is_none());
    }
}
