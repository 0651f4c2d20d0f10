use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Recent successful searches, most recent first. In-memory only.
///
/// Recording a label that is already present leaves the list untouched, so a
/// repeated search does not move its entry to the front.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `true` when the label was inserted.
    pub fn record(&mut self, label: &str) -> bool {
        if self.capacity == 0 || label.is_empty() || self.contains(label) {
            return false;
        }

        self.entries.push_front(label.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
