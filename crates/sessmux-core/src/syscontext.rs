//! System-context detection and title/summary shaping.
//!
//! Coding-assistant CLIs inject machine-generated preambles into the user
//! role: IDE context dumps, agent instruction files, mode banners, pasted
//! shell transcripts. Those must never become a session title, so the
//! title extractor consults [`is_system_context`] before accepting a user
//! message.

// ─── Caps ────────────────────────────────────────────────────────

/// Title cap, characters.
pub const TITLE_MAX: usize = 200;
/// Summary cap, characters.
pub const SUMMARY_MAX: usize = 240;

// ─── System-Context Detection ────────────────────────────────────

/// True when a trimmed user message is machine-generated context rather
/// than something the user typed.
pub fn is_system_context(text: &str) -> bool {
    let t = text.trim_start();
    if t.is_empty() {
        return false;
    }

    if starts_with_xml_tag(t) {
        return true;
    }
    if is_instruction_heading(t) {
        return true;
    }
    if t.starts_with("[MODE:") {
        return true;
    }
    if t.starts_with("You are an automated") {
        return true;
    }
    if is_ide_context_header(t) {
        return true;
    }
    if is_shell_prompt(t) {
        return true;
    }
    if is_numbered_log_dump(t) {
        return true;
    }

    false
}

/// `<name>…` — an XML-wrapped preamble such as `<system-reminder>`.
fn starts_with_xml_tag(t: &str) -> bool {
    let Some(rest) = t.strip_prefix('<') else {
        return false;
    };
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    rest.find('>').is_some_and(|end| {
        rest[..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    })
}

/// `# AGENTS…` / `# Instructions…` / `# System…` markdown headings.
fn is_instruction_heading(t: &str) -> bool {
    let Some(rest) = t.strip_prefix("# ") else {
        return false;
    };
    ["AGENTS", "Instructions", "System"]
        .iter()
        .any(|prefix| rest.starts_with(prefix))
}

/// IDE context preambles, e.g. `IDE context: the user has …`.
fn is_ide_context_header(t: &str) -> bool {
    let lower: String = t.chars().take(32).collect::<String>().to_lowercase();
    lower.starts_with("ide context") || lower.starts_with("context from the ide")
}

/// Pasted shell transcript: `> cmd` or `$ cmd`.
fn is_shell_prompt(t: &str) -> bool {
    t.starts_with("> ") || t.starts_with("$ ")
}

/// Pasted log dump led by a line number: `12, …`.
fn is_numbered_log_dump(t: &str) -> bool {
    let digits = t.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && t[digits..].starts_with(',')
}

// ─── Title / Summary Shaping ─────────────────────────────────────

/// Shape a raw user message into a title: strip a leading code fence and
/// common literal escapes, collapse whitespace, cap at [`TITLE_MAX`].
/// Returns `None` when nothing usable remains.
pub fn clean_title(raw: &str) -> Option<String> {
    let mut text = raw.trim();

    // Leading code fence: drop the fence line, keep the body.
    if text.starts_with("```") {
        text = text
            .split_once('\n')
            .map(|(_, rest)| rest)
            .unwrap_or("")
            .trim_start();
    }

    let unescaped = text
        .replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\\"", "\"");

    let collapsed = unescaped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(truncate_chars(&collapsed, TITLE_MAX))
}

/// Trim and cap a summary string; `None` when empty.
pub fn clean_summary(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, SUMMARY_MAX))
}

/// Character-boundary-safe truncation.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────
