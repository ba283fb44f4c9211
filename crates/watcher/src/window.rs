//! Bounded FIFO of recent request outcomes.

use std::collections::VecDeque;

/// The most recent `capacity` final upstream statuses, oldest first.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    outcomes: VecDeque<String>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window. A zero capacity is treated as one.
    ///
    /// Storage grows with the contents, so a huge capacity costs nothing
    /// until that many outcomes have been recorded.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append an outcome, evicting the oldest one when full.
    pub fn record(&mut self, outcome: impl Into<String>) {
        self.outcomes.push_back(outcome.into());
        if self.outcomes.len() > self.capacity {
            self.outcomes.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(String::as_str)
    }

    /// Copy of the current contents in arrival order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.outcomes.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_up_to_capacity() {
        let mut window = SlidingWindow::new(3);
        assert!(window.is_empty());
        window.record("200");
        window.record("502");
        assert_eq!(window.len(), 2);
        assert_eq!(window.snapshot(), vec!["200", "502"]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut window = SlidingWindow::new(200);
        for i in 0..205 {
            window.record(i.to_string());
            assert!(window.len() <= 200);
        }
        let expected: Vec<String> = (5..205).map(|i: i32| i.to_string()).collect();
        assert_eq!(window.snapshot(), expected);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut window = SlidingWindow::new(0);
        window.record("200");
        window.record("500");
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec!["500"]);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut window = SlidingWindow::new(usize::MAX / 4);
        assert_eq!(window.capacity(), usize::MAX / 4);
        window.record("200");
        assert_eq!(window.len(), 1);
    }
}
