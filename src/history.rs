//! Bounded log of recently issued command lines.

use crate::error::ShellError;
use std::collections::VecDeque;

/// Ring buffer over the most recent command lines.
///
/// Entries are unique: re-issuing a line that is still retained moves it to
/// the most-recent position instead of duplicating it. Indices are
/// chronological within the retained window, 0 being the oldest entry, and
/// are only stable until the next `record`.
#[derive(Debug)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, de-duplicating against everything still retained.
    /// Blank lines are ignored.
    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if let Some(pos) = self.entries.iter().position(|e| e == line) {
            self.entries.remove(pos);
        } else if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// Look up the line stored at `index`.
    pub fn get(&self, index: usize) -> Result<&str, ShellError> {
        self.entries
            .get(index)
            .map(String::as_str)
            .ok_or(ShellError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    /// Retained lines, oldest first, with their current indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(String::as_str).enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
