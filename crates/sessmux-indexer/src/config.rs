//! Indexer tunables, overridable through the environment.

use crate::seen::{DEFAULT_CAP, DEFAULT_RETENTION_MS};

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Per-file debounce window (`CLAUDE_INDEXER_DEBOUNCE_MS`).
    pub debounce_ms: u64,
    /// Seen-session retention window (`CLAUDE_SEEN_SESSION_RETENTION_MS`).
    pub seen_retention_ms: i64,
    /// Seen-session entry cap (`CLAUDE_SEEN_SESSION_MAX`).
    pub seen_cap: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            seen_retention_ms: DEFAULT_RETENTION_MS,
            seen_cap: DEFAULT_CAP,
        }
    }
}

impl IndexerConfig {
    pub fn from_env() -> Self {
        Self {
            debounce_ms: env_parse("CLAUDE_INDEXER_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS),
            seen_retention_ms: env_parse("CLAUDE_SEEN_SESSION_RETENTION_MS", DEFAULT_RETENTION_MS),
            seen_cap: env_parse("CLAUDE_SEEN_SESSION_MAX", DEFAULT_CAP),
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = IndexerConfig::default();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.seen_retention_ms, 7 * 24 * 60 * 60 * 1_000);
        assert_eq!(config.seen_cap, 10_000);
    }
}
