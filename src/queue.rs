//! Fixed-capacity pending-request buffer.
//!
//! Entries are served newest first. This is the order the desk has always
//! used for returns and renewals, so it is kept as is even though callers
//! may expect first-in-first-out.
//!
//! The buffer itself does no locking or waiting; see
//! [`Library`](crate::services::library::Library) for the blocking
//! producer/consumer wrapper.

/// Default number of pending entries
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct RequestQueue<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T> RequestQueue<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert an entry, handing it back if the buffer is full
    pub fn try_push(&mut self, entry: T) -> Result<(), T> {
        if self.is_full() {
            return Err(entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the most recently pushed entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_newest_first() {
        let mut queue = RequestQueue::with_capacity(3);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        queue.try_push(3).unwrap();
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_rejects_when_full() {
        let mut queue = RequestQueue::default();
        for i in 0..DEFAULT_CAPACITY {
            queue.try_push(i).unwrap();
        }
        assert!(queue.is_full());
        assert_eq!(queue.try_push(99), Err(99));
        assert_eq!(queue.len(), DEFAULT_CAPACITY);

        queue.pop();
        assert!(queue.try_push(99).is_ok());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut queue = RequestQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.try_push("a").is_ok());
        assert!(queue.try_push("b").is_err());
    }
}
