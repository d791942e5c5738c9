use models::LogEvent;

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Process-wide count of retained error events.
pub const ERROR_BUFFER_CAPACITY: usize = 50;

/// Bounded FIFO of the most recent error events.
#[derive(Debug)]
pub struct ErrorBuffer {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl ErrorBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append, evicting the oldest entry once full.
    pub fn push(&self, event: LogEvent) {
        if self.capacity == 0 {
            return;
        }

        let mut events = self.events.lock();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new(ERROR_BUFFER_CAPACITY)
    }
}
