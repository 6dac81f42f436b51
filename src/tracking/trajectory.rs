//! Fixed-capacity history of recent ball positions.

use crate::config::TRAJECTORY_CAPACITY;
use crate::geometry::Point2;

/// Circular buffer of the most recent ball centroids.
///
/// Insertion overwrites the oldest entry once the buffer is full. Lookups
/// count backwards from the newest entry.
#[derive(Debug, Clone)]
pub struct TrajectoryBuffer {
    data: [Point2; TRAJECTORY_CAPACITY],
    /// Slot the next insertion goes into.
    tail: usize,
    len: usize,
}

impl Default for TrajectoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryBuffer {
    pub fn new() -> Self {
        Self {
            data: [Point2::default(); TRAJECTORY_CAPACITY],
            tail: 0,
            len: 0,
        }
    }

    pub fn reset(&mut self) {
        self.data = [Point2::default(); TRAJECTORY_CAPACITY];
        self.tail = 0;
        self.len = 0;
    }

    pub fn insert(&mut self, point: Point2) {
        self.data[self.tail] = point;
        self.tail = (self.tail + 1) % TRAJECTORY_CAPACITY;
        self.len = (self.len + 1).min(TRAJECTORY_CAPACITY);
    }

    /// Point `steps_back` insertions before the newest one (`0` is the newest).
    pub fn at(&self, steps_back: usize) -> Option<Point2> {
        if steps_back >= self.len {
            return None;
        }
        let index = (self.tail + TRAJECTORY_CAPACITY - 1 - steps_back) % TRAJECTORY_CAPACITY;
        Some(self.data[index])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        TRAJECTORY_CAPACITY
    }

    /// Points from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Point2> + '_ {
        (0..self.len).filter_map(move |k| self.at(k))
    }
}
