//! Codex provider.
//!
//! Rollout files live under `{home}/sessions/YYYY/MM/DD/`, named
//! `rollout-YYYY-MM-DDThh-mm-ss-<session-id>.jsonl`. The session id also
//! appears in the `session_meta` envelope's payload, which the shared
//! harvest picks up via the `payload.cwd` / `session_id` probes.

use std::path::{Path, PathBuf};

use tracing::warn;

use sessmux_core::types::Provider;

use crate::parse::ParsedMeta;
use crate::{SessionProvider, collect_jsonl, file_stem, home_with_env};

pub struct Codex {
    home: Option<PathBuf>,
}

impl Codex {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    fn sessions_dir(&self) -> Option<PathBuf> {
        self.home_dir().map(|h| h.join("sessions"))
    }
}

impl Default for Codex {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Codex {
    fn kind(&self) -> Provider {
        Provider::Codex
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        home_with_env("CODEX_HOME", ".codex")
    }

    fn watch_root(&self) -> Option<PathBuf> {
        self.sessions_dir()
    }

    fn list_session_files(&self) -> Vec<PathBuf> {
        self.sessions_dir()
            .map(|dir| {
                collect_jsonl(&dir, |path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with("rollout-"))
                })
            })
            .unwrap_or_default()
    }

    fn extract_session_id(&self, path: &Path, meta: &ParsedMeta) -> Option<String> {
        if let Some(id) = &meta.session_id
            && self.is_valid_session_id(id)
        {
            return Some(id.clone());
        }
        if let Some(id) = rollout_filename_id(path) {
            warn!(
                path = %path.display(),
                id = %id,
                "rollout carries no embedded session id, using filename suffix"
            );
            return Some(id);
        }
        warn!(
            path = %path.display(),
            "rollout has no valid session id (embedded or filename), skipping"
        );
        None
    }

    fn is_valid_session_id(&self, id: &str) -> bool {
        !id.trim().is_empty()
    }
}

/// `rollout-YYYY-MM-DDThh-mm-ss-<id>` → `<id>`. The timestamp part is a
/// fixed 19 characters.
fn rollout_filename_id(path: &Path) -> Option<String> {
    let stem = file_stem(path)?;
    let rest = stem.strip_prefix("rollout-")?;
    if rest.len() > 20
        && rest.as_bytes()[19] == b'-'
        && let Some(id) = rest.get(20..)
        && !id.is_empty()
    {
        return Some(id.to_owned());
    }
    None
}

// ─── Tests ───────────────────────────────────────────────────────
