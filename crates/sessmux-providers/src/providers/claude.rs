//! Claude Code provider.
//!
//! Layout is directory-per-project: `{home}/projects/{slug}/*.jsonl`, with
//! an optional `project.json` / `metadata.json` / `config.json` beside the
//! transcripts naming the real project directory. Session ids are UUIDs;
//! the transcript filename carries the same id.

use std::path::{Path, PathBuf};

use serde_json::Value;

use sessmux_core::paths::looks_like_path;
use sessmux_core::types::Provider;

use crate::parse::{PROJECT_META_MAX_BYTES, ParsedMeta};
use crate::{SessionProvider, collect_jsonl, home_with_env};

pub struct Claude {
    home: Option<PathBuf>,
}

impl Claude {
    pub fn new() -> Self {
        Self { home: None }
    }

    /// Discovery rooted at an explicit home directory (tests, embedding).
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    fn projects_dir(&self) -> Option<PathBuf> {
        self.home_dir().map(|h| h.join("projects"))
    }
}

impl Default for Claude {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Claude {
    fn kind(&self) -> Provider {
        Provider::Claude
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        home_with_env("CLAUDE_HOME", ".claude")
    }

    fn cli_command(&self) -> String {
        std::env::var("CLAUDE_CMD")
            .ok()
            .filter(|cmd| !cmd.is_empty())
            .unwrap_or_else(|| "claude".to_owned())
    }

    fn watch_root(&self) -> Option<PathBuf> {
        self.projects_dir()
    }

    fn list_session_files(&self) -> Vec<PathBuf> {
        self.projects_dir()
            .map(|dir| collect_jsonl(&dir, |_| true))
            .unwrap_or_default()
    }

    /// Slug-directory metadata wins, then any other small JSON in the slug
    /// directory, then the transcript's own cwd, then the raw slug.
    fn resolve_project_path(&self, path: &Path, meta: &ParsedMeta) -> Option<String> {
        let slug_dir = path.parent()?;
        if let Some(resolved) = project_path_from_dir_metadata(slug_dir) {
            return Some(resolved);
        }
        if let Some(cwd) = &meta.cwd {
            return Some(cwd.clone());
        }
        slug_dir
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
    }

    fn is_valid_session_id(&self, id: &str) -> bool {
        is_uuid_shape(id)
    }
}

/// UUID shape: `8-4-4-4-12` lowercase-or-uppercase hex.
fn is_uuid_shape(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

const PROJECT_META_FILES: &[&str] = &["project.json", "metadata.json", "config.json"];
const PROJECT_PATH_KEYS: &[&str] = &[
    "projectPath",
    "path",
    "cwd",
    "root",
    "project_root",
    "project_root_path",
];

fn project_path_from_dir_metadata(slug_dir: &Path) -> Option<String> {
    for name in PROJECT_META_FILES {
        if let Some(resolved) = probe_json_file(&slug_dir.join(name)) {
            return Some(resolved);
        }
    }

    // Last resort: any other small JSON file in the slug directory.
    let entries = std::fs::read_dir(slug_dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if PROJECT_META_FILES.contains(&name) {
            continue;
        }
        if let Some(resolved) = probe_json_file(&path) {
            return Some(resolved);
        }
    }
    None
}

fn probe_json_file(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if !meta.is_file() || meta.len() > PROJECT_META_MAX_BYTES {
        return None;
    }
    let content = std::fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    PROJECT_PATH_KEYS
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|s| looks_like_path(s))
        .map(ToOwned::to_owned)
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    const UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("test")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("sessmux-test-{label}-{nonce}"));
        fs::create_dir_all(&dir).expect("test");
        dir
    }

    #[test]
    fn uuid_shape_validation() {
        assert!(is_uuid_shape(UUID));
        assert!(is_uuid_shape("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!is_uuid_shape("not-a-uuid"));
        assert!(!is_uuid_shape("550e8400e29b41d4a716446655440000"));
        assert!(!is_uuid_shape("550e8400-e29b-41d4-a716-44665544000g"));
        assert!(!is_uuid_shape(""));
    }

    #[test]
    fn lists_jsonl_under_projects() {
        let home = unique_temp_dir("claude-list");
        let slug = home.join("projects/-home-u-proj");
        fs::create_dir_all(&slug).expect("test");
        fs::write(slug.join(format!("{UUID}.jsonl")), "{}\n").expect("test");
        fs::write(slug.join("notes.txt"), "ignore").expect("test");

        let provider = Claude::with_home(&home);
        let files = provider.list_session_files();
        assert_eq!(files.len(), 1);
        assert!(provider.owns_path(&files[0]));

        let _ = fs::remove_dir_all(&home);
    }

    #[test]
    fn missing_home_lists_nothing() {
        let provider = Claude::with_home("/definitely/not/here");
        assert!(provider.list_session_files().is_empty());
    }

    #[test]
    fn project_json_beats_transcript_cwd() {
        let home = unique_temp_dir("claude-projmeta");
        let slug = home.join("projects/slug");
        fs::create_dir_all(&slug).expect("test");
        fs::write(slug.join("project.json"), r#"{"projectPath":"/real/project"}"#)
            .expect("test");
        let transcript = slug.join(format!("{UUID}.jsonl"));

        let provider = Claude::with_home(&home);
        let meta = ParsedMeta {
            cwd: Some("/from/transcript".into()),
            ..Default::default()
        };
        assert_eq!(
            provider.resolve_project_path(&transcript, &meta).as_deref(),
            Some("/real/project")
        );

        let _ = fs::remove_dir_all(&home);
    }

    #[test]
    fn other_small_json_is_probed_as_last_resort() {
        let home = unique_temp_dir("claude-anyjson");
        let slug = home.join("projects/slug");
        fs::create_dir_all(&slug).expect("test");
        fs::write(slug.join("workspace.json"), r#"{"root":"/via/other/json"}"#).expect("test");
        let transcript = slug.join(format!("{UUID}.jsonl"));

        let provider = Claude::with_home(&home);
        assert_eq!(
            provider
                .resolve_project_path(&transcript, &ParsedMeta::default())
                .as_deref(),
            Some("/via/other/json")
        );

        let _ = fs::remove_dir_all(&home);
    }

    #[test]
    fn transcript_cwd_then_slug_fallback() {
        let home = unique_temp_dir("claude-fallback");
        let slug = home.join("projects/-home-u-proj");
        fs::create_dir_all(&slug).expect("test");
        let transcript = slug.join(format!("{UUID}.jsonl"));
        let provider = Claude::with_home(&home);

        let meta = ParsedMeta {
            cwd: Some("/home/u/proj".into()),
            ..Default::default()
        };
        assert_eq!(
            provider.resolve_project_path(&transcript, &meta).as_deref(),
            Some("/home/u/proj")
        );
        assert_eq!(
            provider
                .resolve_project_path(&transcript, &ParsedMeta::default())
                .as_deref(),
            Some("-home-u-proj")
        );

        let _ = fs::remove_dir_all(&home);
    }

    #[test]
    fn oversized_metadata_json_is_ignored() {
        let home = unique_temp_dir("claude-bigjson");
        let slug = home.join("projects/slug");
        fs::create_dir_all(&slug).expect("test");
        let big = format!(
            r#"{{"projectPath":"/real","pad":"{}"}}"#,
            "x".repeat(PROJECT_META_MAX_BYTES as usize)
        );
        fs::write(slug.join("project.json"), big).expect("test");
        let transcript = slug.join(format!("{UUID}.jsonl"));

        let provider = Claude::with_home(&home);
        assert_eq!(
            provider.resolve_project_path(&transcript, &ParsedMeta::default()),
            Some("slug".to_owned())
        );

        let _ = fs::remove_dir_all(&home);
    }

    #[test]
    fn embedded_id_wins_over_filename() {
        let provider = Claude::new();
        let other = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let meta = ParsedMeta {
            session_id: Some(other.to_owned()),
            ..Default::default()
        };
        let path = PathBuf::from(format!("/tmp/{UUID}.jsonl"));
        assert_eq!(provider.extract_session_id(&path, &meta).as_deref(), Some(other));
    }

    #[test]
    fn filename_id_used_when_embedded_missing() {
        let provider = Claude::new();
        let path = PathBuf::from(format!("/tmp/{UUID}.jsonl"));
        assert_eq!(
            provider
                .extract_session_id(&path, &ParsedMeta::default())
                .as_deref(),
            Some(UUID)
        );
    }

    #[test]
    fn no_valid_id_anywhere_skips_file() {
        let provider = Claude::new();
        let path = PathBuf::from("/tmp/not-a-uuid.jsonl");
        assert!(provider.extract_session_id(&path, &ParsedMeta::default()).is_none());
    }
}
