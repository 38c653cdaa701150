use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

// ─── Provider ─────────────────────────────────────────────────────

/// Closed set of coding-assistant CLIs whose transcripts we index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Provider {
    Claude,
    Codex,
    Opencode,
    Gemini,
    Kimi,
}

impl Provider {
    pub const ALL: [Self; 5] = [
        Self::Claude,
        Self::Codex,
        Self::Opencode,
        Self::Gemini,
        Self::Kimi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Opencode => "opencode",
            Self::Gemini => "gemini",
            Self::Kimi => "kimi",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude Code",
            Self::Codex => "Codex",
            Self::Opencode => "OpenCode",
            Self::Gemini => "Gemini CLI",
            Self::Kimi => "Kimi CLI",
        }
    }

    /// Whether the provider's CLI accepts a "resume session" argument.
    /// Only resumable sessions participate in terminal binding.
    pub fn supports_resume(self) -> bool {
        !matches!(self, Self::Kimi)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "codex" => Ok(Self::Codex),
            "opencode" => Ok(Self::Opencode),
            "gemini" => Ok(Self::Gemini),
            "kimi" => Ok(Self::Kimi),
            _ => Err(Error::UnknownProvider(s.to_owned())),
        }
    }
}

// ─── Session Key ──────────────────────────────────────────────────

/// Globally unique composite session key `(provider, sessionId)`.
///
/// Rendered and parsed as `provider:sessionId`. A legacy key with no
/// provider prefix parses as `claude:<sessionId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub provider: Provider,
    pub id: String,
}

impl SessionKey {
    pub fn new(provider: Provider, id: impl Into<String>) -> Self {
        Self {
            provider,
            id: id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.id)
    }
}

impl FromStr for SessionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::InvalidSessionKey(s.to_owned()));
        }
        if let Some((prefix, rest)) = s.split_once(':')
            && let Ok(provider) = prefix.parse::<Provider>()
        {
            if rest.is_empty() {
                return Err(Error::InvalidSessionKey(s.to_owned()));
            }
            return Ok(Self::new(provider, rest));
        }
        // Legacy bare session id — attributed to Claude.
        Ok(Self::new(Provider::Claude, s))
    }
}

impl PartialOrd for SessionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SessionKey {
    /// Lexical order of the `provider:id` rendering, so tie-breaks match
    /// the serialized form consumers see.
    fn cmp(&self, other: &Self) -> Ordering {
        self.provider
            .as_str()
            .cmp(other.provider.as_str())
            .then_with(|| self.id.cmp(&other.id))
    }
}

// ─── Session Record ───────────────────────────────────────────────

/// Immutable snapshot of one discovered session, produced per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub key: SessionKey,
    /// Canonical project directory the session is grouped under.
    pub project_path: String,
    /// Working directory recorded inside the transcript. Always non-empty;
    /// a record without one is orphaned and never constructed.
    pub cwd: String,
    /// Filesystem mtime of the transcript, epoch milliseconds.
    pub updated_at_ms: i64,
    /// Pinned creation timestamp, epoch milliseconds.
    pub created_at_ms: i64,
    /// JSONL lines scanned within the parse budget.
    pub message_count: usize,
    pub title: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub source_file: PathBuf,
}

// ─── Project Group ────────────────────────────────────────────────

/// Sessions sharing a project path, plus an optional color tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub path: String,
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Project {
    /// Newest `updated_at_ms` among contained sessions (0 when empty).
    pub fn latest_update_ms(&self) -> i64 {
        self.sessions
            .iter()
            .map(|s| s.updated_at_ms)
            .max()
            .unwrap_or(0)
    }
}

/// Sort sessions within a group: `updated_at` descending, ties by
/// session key ascending.
pub fn sort_sessions(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| {
        b.updated_at_ms
            .cmp(&a.updated_at_ms)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// Sort groups: newest contained `updated_at` descending, ties by
/// project path ascending.
pub fn sort_projects(projects: &mut [Project]) {
    projects.sort_by(|a, b| {
        b.latest_update_ms()
            .cmp(&a.latest_update_ms())
            .then_with(|| a.path.cmp(&b.path))
    });
}

// ─── Tests ────────────────────────────────────────────────────────
