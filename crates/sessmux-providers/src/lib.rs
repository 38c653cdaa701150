//! Provider adapters: one per coding-assistant CLI.
//!
//! Each adapter knows where its CLI deposits JSONL transcripts, how to
//! extract a session id, and how to resolve the project directory. The
//! transcript field probing itself is shared ([`parse`]) — adapters differ
//! in discovery layout and id validation, not in line parsing.

pub mod parse;
pub mod providers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;
use walkdir::WalkDir;

use sessmux_core::types::Provider;

pub use parse::{PARSE_BYTE_BUDGET, ParsedMeta};

// ─── Provider Trait ──────────────────────────────────────────────

/// A coding-assistant CLI whose transcript files we index.
///
/// `parse_session_file` is pure (no I/O); `list_session_files` swallows
/// filesystem errors after logging, yielding an empty list for an
/// unreadable root.
pub trait SessionProvider: Send + Sync {
    fn kind(&self) -> Provider;

    fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Provider home directory (environment override first, then the
    /// platform default). `None` when no home can be resolved.
    fn home_dir(&self) -> Option<PathBuf>;

    /// CLI command used to launch (and resume) this provider.
    fn cli_command(&self) -> String {
        self.kind().as_str().to_owned()
    }

    /// Enumerate all candidate `.jsonl` transcript files.
    fn list_session_files(&self) -> Vec<PathBuf>;

    /// Parse transcript bytes into metadata. Pure function.
    fn parse_session_file(&self, bytes: &[u8], _path: &Path) -> ParsedMeta {
        parse::harvest(bytes, &|id| self.is_valid_session_id(id))
    }

    /// Canonical project directory for a transcript.
    fn resolve_project_path(&self, path: &Path, meta: &ParsedMeta) -> Option<String> {
        let _ = path;
        meta.cwd.clone()
    }

    /// Session id for a transcript: a valid embedded id wins; an invalid
    /// embedded id falls back to a valid filename-derived id with a warn;
    /// neither valid → `None` (the file is skipped, logged at warn).
    fn extract_session_id(&self, path: &Path, meta: &ParsedMeta) -> Option<String> {
        if let Some(id) = &meta.session_id
            && self.is_valid_session_id(id)
        {
            return Some(id.clone());
        }
        if let Some(stem) = file_stem(path)
            && self.is_valid_session_id(&stem)
        {
            warn!(
                path = %path.display(),
                id = %stem,
                "transcript carries no valid embedded session id, using filename"
            );
            return Some(stem);
        }
        warn!(
            path = %path.display(),
            "transcript has no valid session id (embedded or filename), skipping"
        );
        None
    }

    fn is_valid_session_id(&self, id: &str) -> bool;

    fn supports_resume(&self) -> bool {
        self.kind().supports_resume()
    }

    /// Directory watched for transcript churn. Defaults to the home dir;
    /// providers narrow it to their session subtree.
    fn watch_root(&self) -> Option<PathBuf> {
        self.home_dir()
    }

    /// Whether a filesystem event path belongs to this provider. Pure
    /// string/prefix logic — must also hold for paths that no longer
    /// exist, so unlink events route correctly.
    fn owns_path(&self, path: &Path) -> bool {
        let Some(root) = self.watch_root() else {
            return false;
        };
        path.starts_with(&root) && is_jsonl(path)
    }
}

/// All known providers, discovery rooted at their default homes.
pub fn all_providers() -> Vec<Arc<dyn SessionProvider>> {
    vec![
        Arc::new(providers::claude::Claude::new()),
        Arc::new(providers::codex::Codex::new()),
        Arc::new(providers::opencode::OpenCode::new()),
        Arc::new(providers::gemini::Gemini::new()),
        Arc::new(providers::kimi::Kimi::new()),
    ]
}

// ─── Shared Helpers ──────────────────────────────────────────────

pub(crate) fn is_jsonl(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"))
}

pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(ToOwned::to_owned)
}

/// Home directory with an environment-variable override, as every CLI in
/// this family supports.
pub(crate) fn home_with_env(var: &str, default_name: &str) -> Option<PathBuf> {
    if let Ok(home) = std::env::var(var)
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|h| h.join(default_name))
}

/// Recursively collect `.jsonl` files under `root` that pass `accept`.
/// Unreadable directories are logged and skipped.
pub(crate) fn collect_jsonl(root: &Path, accept: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).max_depth(6) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let path = entry.path();
                if is_jsonl(path) && accept(path) {
                    files.push(path.to_path_buf());
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(root = %root.display(), error = %e, "failed to walk session directory");
            }
        }
    }
    files.sort();
    files
}
