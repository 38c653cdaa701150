//! Bounded memory of session keys the indexer has ever observed.
//!
//! Backs the "new session" test: a key that was exposed once must not
//! fire a second notification after churn (file rewritten, override
//! toggled, indexer diffing). Entries expire after the retention window
//! and the map is capped; past the cap the oldest entries go first.

use std::collections::HashMap;

use sessmux_core::types::SessionKey;

pub const DEFAULT_RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1_000;
pub const DEFAULT_CAP: usize = 10_000;

#[derive(Debug)]
pub struct SeenSessions {
    entries: HashMap<SessionKey, i64>,
    retention_ms: i64,
    cap: usize,
}

impl SeenSessions {
    pub fn new(retention_ms: i64, cap: usize) -> Self {
        Self {
            entries: HashMap::new(),
            retention_ms,
            cap,
        }
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Record an observation of `key` at `now_ms`.
    pub fn touch(&mut self, key: &SessionKey, now_ms: i64) {
        self.entries.insert(key.clone(), now_ms);
    }

    /// Drop entries past the retention window; if still over cap, discard
    /// the oldest until the cap holds.
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        self.entries.retain(|_, last_seen| *last_seen >= cutoff);

        if self.entries.len() > self.cap {
            let mut by_age: Vec<(SessionKey, i64)> = self
                .entries
                .iter()
                .map(|(k, &ts)| (k.clone(), ts))
                .collect();
            by_age.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            for (key, _) in by_age.iter().take(self.entries.len() - self.cap) {
                self.entries.remove(key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sessmux_core::types::Provider;

    fn key(id: &str) -> SessionKey {
        SessionKey::new(Provider::Claude, id)
    }

    #[test]
    fn touch_and_contains() {
        let mut seen = SeenSessions::new(DEFAULT_RETENTION_MS, DEFAULT_CAP);
        assert!(!seen.contains(&key("a")));
        seen.touch(&key("a"), 1_000);
        assert!(seen.contains(&key("a")));
    }

    #[test]
    fn entries_expire_after_retention() {
        let mut seen = SeenSessions::new(10_000, DEFAULT_CAP);
        seen.touch(&key("old"), 0);
        seen.touch(&key("fresh"), 9_000);

        seen.prune(12_000);
        assert!(!seen.contains(&key("old")));
        assert!(seen.contains(&key("fresh")));
    }

    #[test]
    fn retouch_refreshes_the_window() {
        let mut seen = SeenSessions::new(10_000, DEFAULT_CAP);
        seen.touch(&key("a"), 0);
        seen.touch(&key("a"), 20_000);
        seen.prune(25_000);
        assert!(seen.contains(&key("a")));
    }

    #[test]
    fn cap_discards_oldest_first() {
        let mut seen = SeenSessions::new(i64::MAX / 2, 3);
        for (i, ts) in [("a", 10), ("b", 20), ("c", 30), ("d", 40), ("e", 50)] {
            seen.touch(&key(i), ts);
        }
        seen.prune(60);
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&key("a")));
        assert!(!seen.contains(&key("b")));
        assert!(seen.contains(&key("c")));
        assert!(seen.contains(&key("e")));
    }

    #[test]
    fn prune_under_cap_keeps_everything() {
        let mut seen = SeenSessions::new(10_000, 100);
        seen.touch(&key("a"), 5_000);
        seen.touch(&key("b"), 6_000);
        seen.prune(7_000);
        assert_eq!(seen.len(), 2);
    }
}
