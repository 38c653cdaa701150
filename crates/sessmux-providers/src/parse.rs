//! Shared JSONL metadata harvest.
//!
//! Transcripts are append-only, one JSON value per line. Parsing walks
//! lines until the byte budget is exhausted, the metadata is complete, or
//! the file ends — whichever comes first. Each CLI version uses a slightly
//! different schema, so every known field location is probed and the first
//! hit wins; fields already harvested are left alone (except `created_at`,
//! which keeps the minimum across lines). Malformed lines count toward
//! `message_count` and are otherwise skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sessmux_core::paths::looks_like_path;
use sessmux_core::syscontext::{clean_summary, clean_title, is_system_context};

/// Upper bound on transcript bytes examined per parse.
pub const PARSE_BYTE_BUDGET: usize = 256 * 1024;

/// Metadata size cap for auxiliary JSON files consulted during project
/// resolution.
pub const PROJECT_META_MAX_BYTES: u64 = 200 * 1024;

// ─── Parsed Meta ─────────────────────────────────────────────────

/// Header metadata harvested from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMeta {
    /// Embedded session id, present only when the provider's validator
    /// accepted it.
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Minimum parseable timestamp across scanned lines, epoch ms.
    pub created_at_ms: Option<i64>,
    /// JSONL lines scanned (bounded by the parse budget).
    pub message_count: usize,
}

impl ParsedMeta {
    /// All harvestable fields filled — parsing may stop early.
    pub fn is_complete(&self) -> bool {
        self.session_id.is_some()
            && self.cwd.is_some()
            && self.title.is_some()
            && self.summary.is_some()
            && self.created_at_ms.is_some()
    }
}

// ─── Harvest ─────────────────────────────────────────────────────

/// Harvest with the default byte budget.
pub fn harvest(bytes: &[u8], is_valid_id: &dyn Fn(&str) -> bool) -> ParsedMeta {
    harvest_with_budget(bytes, PARSE_BYTE_BUDGET, is_valid_id)
}

/// Harvest transcript metadata line by line under an explicit budget.
pub fn harvest_with_budget(
    bytes: &[u8],
    budget: usize,
    is_valid_id: &dyn Fn(&str) -> bool,
) -> ParsedMeta {
    let mut meta = ParsedMeta::default();
    let mut offset = 0;

    while offset < bytes.len() && offset < budget {
        if meta.is_complete() {
            break;
        }
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| offset + i)
            .unwrap_or(bytes.len());
        let line_bytes = &bytes[offset..end];
        offset = end + 1;

        let Ok(line) = std::str::from_utf8(line_bytes) else {
            meta.message_count += 1;
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        meta.message_count += 1;

        let Ok(value) = serde_json::from_str::<Value>(line) else {
            // Malformed JSON still counts as a line.
            continue;
        };
        absorb_line(&mut meta, &value, is_valid_id);
    }

    meta
}

const SESSION_ID_PATHS: &[&[&str]] = &[
    &["sessionId"],
    &["session_id"],
    &["message", "sessionId"],
    &["message", "session_id"],
    &["data", "sessionId"],
    &["data", "session_id"],
];

const CWD_PATHS: &[&[&str]] = &[
    &["cwd"],
    &["context", "cwd"],
    &["payload", "cwd"],
    &["data", "cwd"],
    &["message", "cwd"],
];

const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "created_at", "createdAt"];

fn absorb_line(meta: &mut ParsedMeta, value: &Value, is_valid_id: &dyn Fn(&str) -> bool) {
    if meta.session_id.is_none() {
        meta.session_id = SESSION_ID_PATHS
            .iter()
            .filter_map(|path| get_str(value, path))
            .find(|id| is_valid_id(id))
            .map(ToOwned::to_owned);
    }

    if meta.cwd.is_none() {
        meta.cwd = CWD_PATHS
            .iter()
            .filter_map(|path| get_str(value, path))
            .find(|s| looks_like_path(s))
            .map(|s| s.trim().to_owned());
    }

    if meta.title.is_none() {
        meta.title = explicit_title(value).or_else(|| user_message_title(value));
    }

    if meta.summary.is_none() {
        meta.summary = get_str(value, &["summary"])
            .or_else(|| get_str(value, &["sessionSummary"]))
            .and_then(clean_summary);
    }

    if let Some(ts) = TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(parse_timestamp_ms))
        .min()
    {
        meta.created_at_ms = Some(match meta.created_at_ms {
            Some(existing) => existing.min(ts),
            None => ts,
        });
    }
}

fn explicit_title(value: &Value) -> Option<String> {
    get_str(value, &["title"])
        .or_else(|| get_str(value, &["sessionTitle"]))
        .and_then(clean_title)
}

/// First user message becomes the title, unless it is machine-generated
/// context (IDE dumps, instruction files, mode banners…).
fn user_message_title(value: &Value) -> Option<String> {
    let (role, content) = if let Some(role) = get_str(value, &["role"]) {
        (role, get_str(value, &["content"])?)
    } else {
        (
            get_str(value, &["message", "role"])?,
            get_str(value, &["message", "content"])?,
        )
    };
    if role != "user" || is_system_context(content) {
        return None;
    }
    clean_title(content)
}

fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = value;
    for seg in path {
        cur = cur.get(seg)?;
    }
    cur.as_str()
}

/// Numeric epoch (seconds or milliseconds) or a parseable date string.
fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        // Values below ~year 5138 in seconds are treated as seconds.
        return Some(if n.abs() < 100_000_000_000 { n * 1_000 } else { n });
    }
    if let Some(f) = value.as_f64() {
        let ms = if f.abs() < 100_000_000_000.0 { f * 1_000.0 } else { f };
        return Some(ms as i64);
    }
    let s = value.as_str()?.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().timestamp_millis());
    }
    None
}

// ─── Tests ───────────────────────────────────────────────────────
