//! Fixed-capacity FIFO sample buffer

use std::collections::VecDeque;

/// Fixed-capacity FIFO buffer
///
/// Holds at most `capacity` samples; pushing into a full window evicts the
/// oldest one. No numeric validation is done here.
#[derive(Debug, Clone)]
pub struct RollingWindow<T = f64> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window (capacity is clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, returning the evicted oldest value if the window was full
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.values.len() >= self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    /// Remove all values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.values.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.values.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut window = RollingWindow::new(5);
        assert_eq!(window.size(), 0);
        assert!(!window.is_full());

        for i in 0..5 {
            assert_eq!(window.push(i as f64), None);
        }

        assert_eq!(window.size(), 5);
        assert!(window.is_full());
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut window = RollingWindow::new(3);
        for i in 0..3 {
            window.push(i);
        }

        // Each push beyond capacity returns the oldest held value, in insertion order
        assert_eq!(window.push(10), Some(0));
        assert_eq!(window.push(11), Some(1));
        assert_eq!(window.push(12), Some(2));
        assert_eq!(window.push(13), Some(10));

        assert_eq!(window.size(), 3);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![11, 12, 13]);
    }

    #[test]
    fn test_clear_resets() {
        let mut window = RollingWindow::new(5);
        for i in 0..6 {
            window.push(i as f64);
        }
        assert_eq!(window.push(99.0), Some(1.0));

        window.clear();
        assert_eq!(window.size(), 0);
        assert!(!window.is_full());
        assert!(window.oldest().is_none());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), Some(1));
    }
}
