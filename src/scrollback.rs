//! Scrollback log for TiltSketch
//!
//! Bounded, timestamped history of device lines and status messages. Oldest entries are
//! evicted first once the capacity is reached.

use std::collections::VecDeque;

use chrono::{DateTime, Local, TimeZone};

/// Placeholder shown while nothing has been logged yet
pub const EMPTY_PLACEHOLDER: &str = "Waiting for data...";

#[derive(Debug, Clone)]
pub struct ScrollbackLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ScrollbackLog {
    /// A capacity of zero is raised to one. Storage grows with use, not with `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append `message` stamped with the current local time
    pub fn push(&mut self, message: &str) {
        self.push_at(message, Local::now());
    }

    /// Append `message` stamped with `time`
    pub fn push_at<Tz: TimeZone>(&mut self, message: &str, time: DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.entries.push_back(format!("[{}] {message}", time.format("%H:%M:%S")));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whole log as display text, one entry per line
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(entry);
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_timestamp_prefix() {
        let mut log = ScrollbackLog::new(10);
        log.push_at("X: 1.0, Y: 2.0, Z: 3.0", at(9, 5, 7));
        assert_eq!(log.last(), Some("[09:05:07] X: 1.0, Y: 2.0, Z: 3.0"));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = ScrollbackLog::new(3);
        for i in 0..5 {
            log.push_at(&format!("line {i}"), at(12, 0, i));
        }
        assert_eq!(log.len(), 3);
        let entries: Vec<&str> = log.entries().collect();
        assert_eq!(
            entries,
            vec!["[12:00:02] line 2", "[12:00:03] line 3", "[12:00:04] line 4"]
        );
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = ScrollbackLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.len(), 1);
        assert!(log.last().unwrap().ends_with("] b"));
    }

    #[test]
    fn test_render_placeholder_and_lines() {
        let mut log = ScrollbackLog::new(5);
        assert_eq!(log.render(), EMPTY_PLACEHOLDER);

        log.push_at("first", at(1, 2, 3));
        log.push_at("second", at(1, 2, 4));
        assert_eq!(log.render(), "[01:02:03] first\n[01:02:04] second\n");
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut log = ScrollbackLog::new(usize::MAX);
        log.push_at("only", at(0, 0, 1));
        assert_eq!(log.capacity(), usize::MAX);
        assert_eq!(log.len(), 1);
    }
}
