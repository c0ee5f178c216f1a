use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use super::types::HistoryPoint;

/// Maximum number of probe outcomes kept per endpoint
pub const HISTORY_CAPACITY: usize = 120;

/// Bounded, time-ordered record of probe outcomes for one endpoint.
///
/// Points are appended at the tail; once the capacity is reached the oldest
/// point is evicted from the head first.
#[derive(Debug)]
pub struct History {
    points: VecDeque<HistoryPoint>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self { points: VecDeque::with_capacity(HISTORY_CAPACITY) }
    }

    /// Append a point, evicting the oldest one at capacity. O(1) amortized.
    pub fn record(&mut self, point: HistoryPoint) {
        if self.points.len() == HISTORY_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Points no older than `max_age` relative to `now`, oldest first.
    /// Pure read; never mutates the store.
    pub fn window(
        &self,
        max_age: Duration,
        now: SystemTime,
    ) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter().filter(move |point| point.age(now) <= max_age)
    }

    /// Most recently recorded point, if any.
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
