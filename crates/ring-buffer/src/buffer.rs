//! Ring Buffer Implementation

use std::collections::VecDeque;

/// Bounded FIFO, insert-then-evict-oldest
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    storage: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer; a capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an item, returning the evicted oldest item if full
    pub fn push(&mut self, item: T) -> Option<T> {
        self.storage.push_back(item);
        if self.storage.len() > self.capacity {
            self.storage.pop_front()
        } else {
            None
        }
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Most recently pushed item
    pub fn latest(&self) -> Option<&T> {
        self.storage.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.storage.iter()
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Read the last N items (most recent first)
    pub fn read_last(&self, count: usize) -> Vec<T> {
        self.storage.iter().rev().take(count).cloned().collect()
    }
}
