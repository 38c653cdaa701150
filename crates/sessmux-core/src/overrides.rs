//! User-facing session overrides, applied as the last step of every scan.
//!
//! The config store keys overrides by composite `provider:sessionId`;
//! legacy bare ids are accepted with a warning and attributed to Claude.
//! An override may mutate title / summary / createdAt / archived, or delete
//! the record from exposure entirely.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{SessionKey, SessionRecord};

/// Per-session override record as stored in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOverride {
    /// Removes the session from exposure.
    pub deleted: bool,
    pub title_override: Option<String>,
    pub summary_override: Option<String>,
    /// Epoch milliseconds. The only way a pinned `created_at` may move.
    pub created_at_override: Option<i64>,
    pub archived: Option<bool>,
}

impl SessionOverride {
    /// True when the override carries no effect at all.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse an override store key. Composite `provider:sessionId` is the
/// canonical form; a legacy bare id is accepted with a warning.
pub fn parse_override_key(raw: &str) -> Option<SessionKey> {
    let key = raw.parse::<SessionKey>().ok()?;
    if !raw.contains(':') || !raw.starts_with(&format!("{}:", key.provider)) {
        warn!(key = raw, "legacy override key without provider prefix, assuming claude");
    }
    Some(key)
}

/// Merge an override into a session record.
///
/// Returns `None` when the override deletes the session; the caller drops
/// the record from exposure.
pub fn apply_override(record: &SessionRecord, ov: &SessionOverride) -> Option<SessionRecord> {
    if ov.deleted {
        return None;
    }
    let mut merged = record.clone();
    if let Some(title) = &ov.title_override {
        merged.title = Some(title.clone());
    }
    if let Some(summary) = &ov.summary_override {
        merged.summary = Some(summary.clone());
    }
    if let Some(created_at) = ov.created_at_override {
        merged.created_at_ms = created_at;
    }
    if let Some(archived) = ov.archived {
        merged.archived = archived;
    }
    Some(merged)
}

// ─── Tests ───────────────────────────────────────────────────────
