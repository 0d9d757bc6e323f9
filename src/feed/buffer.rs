//! Fixed-capacity rolling window
//!
//! Inserting into a full buffer evicts the oldest element (FIFO). The buffer is
//! a display window only: anything derived from the elements, such as a
//! cumulative total, is tracked by the owner.

use std::collections::VecDeque;

use super::error::{FeedError, FeedResult};

#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements
    pub fn new(capacity: usize) -> FeedResult<Self> {
        if capacity == 0 {
            return Err(FeedError::ZeroCapacity);
        }

        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append at the tail, returning the evicted head if the buffer overflowed
    pub fn insert(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    /// Insert every element in order, returning how many were evicted
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) -> usize {
        items
            .into_iter()
            .filter_map(|item| self.insert(item))
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently inserted element
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest element still in the window
    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RollingBuffer<T> {
    /// Contents oldest to newest, without mutating the buffer
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Contents newest to oldest
    pub fn newest_first(&self) -> Vec<T> {
        self.items.iter().rev().cloned().collect()
    }
}
