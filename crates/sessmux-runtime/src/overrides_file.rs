//! Override store backed by a JSON file.
//!
//! The file maps override keys (composite `provider:sessionId`, legacy
//! bare ids accepted with a warning) to override records. It is re-read
//! on every scan so edits take effect on the next refresh; a missing or
//! unreadable file is an empty override set.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

use sessmux_core::overrides::{SessionOverride, parse_override_key};
use sessmux_core::types::SessionKey;
use sessmux_indexer::OverrideSource;

pub struct FileOverrides {
    path: PathBuf,
}

impl FileOverrides {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$SESSMUX_OVERRIDES`, else `~/.sessmux/overrides.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("SESSMUX_OVERRIDES")
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sessmux")
            .join("overrides.json")
    }
}

impl OverrideSource for FileOverrides {
    fn overrides(&self) -> HashMap<SessionKey, SessionOverride> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read overrides file");
                return HashMap::new();
            }
        };

        let raw: HashMap<String, SessionOverride> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed overrides file");
                return HashMap::new();
            }
        };

        raw.into_iter()
            .filter_map(|(key, ov)| parse_override_key(&key).map(|key| (key, ov)))
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
