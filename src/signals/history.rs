//! Bounded, chronological record of emitted signals.

use std::collections::VecDeque;

use crate::models::signal::Signal;

pub const HISTORY_CAPACITY: usize = 100;
pub const RECENT_WINDOW: usize = 50;
pub const WIN_RATE_WINDOW: usize = 20;
/// Below this many entries the win rate is reported as 0.
pub const WIN_RATE_MIN_SAMPLES: usize = 10;

#[derive(Debug, Clone)]
pub struct HistoryLedger {
    entries: VecDeque<Signal>,
    latest: Option<Signal>,
    capacity: usize,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            latest: None,
            capacity,
        }
    }

    /// Append and evict from the front until the cap holds.
    pub fn append(&mut self, signal: Signal) {
        self.latest = Some(signal.clone());
        self.entries.push_back(signal);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Signal> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn latest(&self) -> Option<&Signal> {
        self.latest.as_ref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.latest = None;
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

    /// Percentage of wins over the last 20 entries; 0 with fewer than 10 entries.
    pub fn win_rate(&self) -> f64 {
        if self.entries.len() < WIN_RATE_MIN_SAMPLES {
            return 0.0;
        }
        let window = self.entries.len().min(WIN_RATE_WINDOW);
        let wins = self
            .entries
            .iter()
            .rev()
            .take(window)
            .filter(|s| s.is_win())
            .count();
        wins as f64 / window as f64 * 100.0
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}
