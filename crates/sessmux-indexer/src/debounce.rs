//! Per-path debounce deadlines.
//!
//! Every filesystem event re-arms its path's deadline; a tick loop fires
//! the paths whose deadline has passed. Pure — all time values are passed
//! in, so the coalescing behavior is testable without a clock.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DebounceMap {
    window: Duration,
    deadlines: HashMap<PathBuf, Instant>,
}

impl DebounceMap {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadlines: HashMap::new(),
        }
    }

    /// Record an event for `path` at `now`, re-arming its deadline.
    pub fn note(&mut self, path: PathBuf, now: Instant) {
        self.deadlines.insert(path, now + self.window);
    }

    /// Remove and return all paths whose deadline has passed, sorted for
    /// deterministic processing order.
    pub fn due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut fired: Vec<PathBuf> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &fired {
            self.deadlines.remove(path);
        }
        fired.sort();
        fired
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
