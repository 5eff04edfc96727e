use std::collections::VecDeque;

use crate::foundation::core::Point;

// Larger trails grow on demand.
const PREALLOC_LIMIT: usize = 128;

/// Fixed-capacity history of positions, oldest first.
///
/// Pushing past capacity evicts from the front, so memory stays bounded no matter how long a
/// trace lives.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    points: VecDeque<Point>,
    capacity: usize,
}

impl Trail {
    /// A trail holding only `start`. A zero capacity is treated as one.
    pub fn starting_at(start: Point, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut points = VecDeque::with_capacity(capacity.min(PREALLOC_LIMIT));
        points.push_back(start);
        Self { points, capacity }
    }

    pub fn push(&mut self, p: Point) {
        self.points.push_back(p);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<Point> {
        self.points.front().copied()
    }

    pub fn newest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        self.points.iter()
    }

    /// Contiguous copy, oldest first.
    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }
}
