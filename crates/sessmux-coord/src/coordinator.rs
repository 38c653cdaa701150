//! Watermark-tracked association coordinator.
//!
//! Decides when a freshly indexed session should be offered for binding.
//! Per-session watermarks deduplicate re-processing across scans: a
//! session is a candidate only while its `updated_at` strictly exceeds
//! the stored watermark, and accepting a candidate advances it. The
//! pairing attempt itself is single-shot — a rejected bind is reported as
//! not-associated, never retried, and never steals an owned session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sessmux_core::types::{Project, SessionKey, SessionRecord};

use crate::registry::AssociationRegistry;

/// A session older than this relative to a terminal's spawn time must not
/// bind it — the terminal was created for a different run.
pub const DEFAULT_MAX_ASSOCIATION_AGE_MS: i64 = 30_000;

/// Result of a single-shot association attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationOutcome {
    pub associated: bool,
    pub terminal_id: Option<String>,
}

impl AssociationOutcome {
    fn miss() -> Self {
        Self {
            associated: false,
            terminal_id: None,
        }
    }
}

pub struct AssociationCoordinator {
    registry: Arc<dyn AssociationRegistry>,
    watermarks: Mutex<HashMap<SessionKey, i64>>,
    max_association_age_ms: i64,
}

impl AssociationCoordinator {
    pub fn new(registry: Arc<dyn AssociationRegistry>) -> Self {
        Self::with_max_age(registry, DEFAULT_MAX_ASSOCIATION_AGE_MS)
    }

    pub fn with_max_age(registry: Arc<dyn AssociationRegistry>, max_association_age_ms: i64) -> Self {
        Self {
            registry,
            watermarks: Mutex::new(HashMap::new()),
            max_association_age_ms,
        }
    }

    /// Candidate test for a single session; advances the watermark when
    /// accepted. Used by the incremental path.
    pub fn note_session(&self, session: &SessionRecord) -> bool {
        let mut watermarks = self.watermarks.lock().expect("watermarks lock poisoned");
        if !is_eligible(session, &watermarks) {
            return false;
        }
        watermarks.insert(session.key.clone(), session.updated_at_ms);
        true
    }

    /// Filter a full projects snapshot down to new-or-advanced sessions,
    /// advancing watermarks. Iteration order is the projects/session sort
    /// order, which fixes the pairing order when sessions compete for
    /// terminals in the same cwd.
    pub fn collect_new_or_advanced(&self, projects: &[Project]) -> Vec<SessionRecord> {
        let mut watermarks = self.watermarks.lock().expect("watermarks lock poisoned");
        let mut accepted = Vec::new();
        for project in projects {
            for session in &project.sessions {
                if is_eligible(session, &watermarks) {
                    watermarks.insert(session.key.clone(), session.updated_at_ms);
                    accepted.push(session.clone());
                }
            }
        }
        accepted
    }

    /// Single-shot pairing attempt for one session.
    ///
    /// A candidate consumes the oldest unassociated terminal at its cwd
    /// whose spawn time is not newer than `updated_at + max_age`. Any bind
    /// rejection yields `associated: false`.
    pub fn associate_single_session(&self, session: &SessionRecord) -> AssociationOutcome {
        if !self.note_session(session) {
            return AssociationOutcome::miss();
        }

        let provider = session.key.provider;
        let candidates = self
            .registry
            .find_unassociated_terminals(provider, &session.cwd);
        let cutoff = session.updated_at_ms + self.max_association_age_ms;
        let Some(pick) = candidates.iter().find(|t| t.created_at_ms <= cutoff) else {
            debug!(key = %session.key, "no age-eligible terminal for session");
            return AssociationOutcome::miss();
        };

        match self
            .registry
            .bind_session(&pick.terminal_id, provider, &session.key.id)
        {
            Ok(()) => AssociationOutcome {
                associated: true,
                terminal_id: Some(pick.terminal_id.clone()),
            },
            Err(reject) => {
                debug!(key = %session.key, terminal = %pick.terminal_id, ?reject, "bind rejected");
                AssociationOutcome::miss()
            }
        }
    }

    /// Number of tracked watermarks. Test support.
    pub fn watermark_count(&self) -> usize {
        self.watermarks.lock().expect("watermarks lock poisoned").len()
    }
}

fn is_eligible(session: &SessionRecord, watermarks: &HashMap<SessionKey, i64>) -> bool {
    if !session.key.provider.supports_resume() || session.cwd.is_empty() {
        return false;
    }
    match watermarks.get(&session.key) {
        Some(&mark) => session.updated_at_ms > mark,
        None => true,
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryTerminalRegistry;
    use sessmux_core::binding::BindingAuthority;
    use sessmux_core::types::Provider;
    use std::path::PathBuf;

    const CLAUDE_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn session(provider: Provider, id: &str, cwd: &str, updated_at_ms: i64) -> SessionRecord {
        SessionRecord {
            key: SessionKey::new(provider, id),
            project_path: cwd.to_owned(),
            cwd: cwd.to_owned(),
            updated_at_ms,
            created_at_ms: updated_at_ms,
            message_count: 1,
            title: None,
            summary: None,
            archived: false,
            source_file: PathBuf::from(format!("/tmp/{id}.jsonl")),
        }
    }

    fn setup() -> (Arc<InMemoryTerminalRegistry>, AssociationCoordinator) {
        let registry = Arc::new(InMemoryTerminalRegistry::new(Arc::new(
            std::sync::Mutex::new(BindingAuthority::new()),
        )));
        let coordinator = AssociationCoordinator::new(Arc::clone(&registry) as Arc<dyn AssociationRegistry>);
        (registry, coordinator)
    }

    // ── 1. Fresh session associates with the oldest terminal ─────

    #[test]
    fn fresh_session_takes_the_oldest_waiting_terminal() {
        let (registry, coordinator) = setup();
        registry.register_terminal("t1", Provider::Claude, "/home/u/project", 1_000);
        registry.register_terminal("t2", Provider::Claude, "/home/u/project", 5_000);

        let outcome = coordinator
            .associate_single_session(&session(Provider::Claude, CLAUDE_UUID, "/home/u/project", 2_000));

        assert_eq!(
            outcome,
            AssociationOutcome {
                associated: true,
                terminal_id: Some("t1".to_owned())
            }
        );
        // t2 stays unbound.
        let free = registry.find_unassociated_terminals(Provider::Claude, "/home/u/project");
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].terminal_id, "t2");
    }

    // ── 2. A stale session does not bind a newer terminal ────────

    #[test]
    fn stale_session_skips_fresh_terminal() {
        let (registry, coordinator) = setup();
        let two_hours = 2 * 60 * 60 * 1_000;
        registry.register_terminal("t1", Provider::Codex, "/work", two_hours + 1_000_000);

        let outcome =
            coordinator.associate_single_session(&session(Provider::Codex, "sess-A", "/work", 1_000_000));

        assert_eq!(outcome, AssociationOutcome::miss());
        // No bind was attempted: the terminal is still free.
        assert_eq!(
            registry.find_unassociated_terminals(Provider::Codex, "/work").len(),
            1
        );
    }

    #[test]
    fn terminal_at_exact_age_boundary_is_eligible() {
        let (registry, coordinator) = setup();
        registry.register_terminal(
            "t1",
            Provider::Claude,
            "/p",
            1_000 + DEFAULT_MAX_ASSOCIATION_AGE_MS,
        );

        let outcome =
            coordinator.associate_single_session(&session(Provider::Claude, CLAUDE_UUID, "/p", 1_000));
        assert!(outcome.associated);
    }

    // ── 3. The coordinator never steals an owned session ─────────

    #[test]
    fn owned_session_is_never_stolen() {
        let (registry, coordinator) = setup();
        registry.register_terminal("t1", Provider::Codex, "/work", 1_000);
        registry.register_terminal("t2", Provider::Codex, "/work", 2_000);
        registry.bind_session("t1", Provider::Codex, "sess-A").expect("bind");

        // Session advanced; t1 owns it; t2 is free — but a fresh bind for
        // the same session must be rejected, not moved.
        let outcome =
            coordinator.associate_single_session(&session(Provider::Codex, "sess-A", "/work", 3_000));
        assert_eq!(outcome, AssociationOutcome::miss());

        let authority = registry.authority();
        let authority = authority.lock().expect("test");
        assert_eq!(authority.owner_for_session(Provider::Codex, "sess-A"), Some("t1"));
    }

    // ── 4. Watermarks deduplicate re-scans ───────────────────────

    #[test]
    fn watermark_blocks_unchanged_session() {
        let (_registry, coordinator) = setup();
        let s = session(Provider::Claude, CLAUDE_UUID, "/p", 5_000);

        assert!(coordinator.note_session(&s), "first sighting is a candidate");
        assert!(!coordinator.note_session(&s), "same updated_at is not");
        assert!(
            coordinator.note_session(&session(Provider::Claude, CLAUDE_UUID, "/p", 6_000)),
            "advanced updated_at is a candidate again"
        );
        assert_eq!(coordinator.watermark_count(), 1);
    }

    #[test]
    fn non_resumable_provider_is_never_a_candidate() {
        let (_registry, coordinator) = setup();
        assert!(!coordinator.note_session(&session(Provider::Kimi, "k-1", "/p", 1_000)));
        assert_eq!(coordinator.watermark_count(), 0);
    }

    #[test]
    fn empty_cwd_is_never_a_candidate() {
        let (_registry, coordinator) = setup();
        let mut s = session(Provider::Claude, CLAUDE_UUID, "/p", 1_000);
        s.cwd = String::new();
        assert!(!coordinator.note_session(&s));
    }

    // ── 5. collect_new_or_advanced preserves scan order ──────────

    #[test]
    fn collect_filters_and_advances_in_order() {
        let (_registry, coordinator) = setup();
        let projects = vec![Project {
            path: "/p".to_owned(),
            sessions: vec![
                session(Provider::Claude, CLAUDE_UUID, "/p", 9_000),
                session(Provider::Codex, "cx-1", "/p", 5_000),
                session(Provider::Kimi, "k-1", "/p", 7_000),
            ],
            color: None,
        }];

        let first = coordinator.collect_new_or_advanced(&projects);
        let ids: Vec<&str> = first.iter().map(|s| s.key.id.as_str()).collect();
        assert_eq!(ids, vec![CLAUDE_UUID, "cx-1"], "kimi filtered, order kept");

        // Second pass over the same snapshot: watermarks swallow it all.
        assert!(coordinator.collect_new_or_advanced(&projects).is_empty());
    }

    // ── 6. Deterministic pairing when sessions share a cwd ───────

    #[test]
    fn sessions_drain_terminals_without_fanning_out() {
        let (registry, coordinator) = setup();
        registry.register_terminal("t1", Provider::Claude, "/p", 1_000);
        registry.register_terminal("t2", Provider::Claude, "/p", 2_000);

        let first = session(Provider::Claude, CLAUDE_UUID, "/p", 3_000);
        let second = session(
            Provider::Claude,
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "/p",
            4_000,
        );

        let o1 = coordinator.associate_single_session(&first);
        let o2 = coordinator.associate_single_session(&second);
        assert_eq!(o1.terminal_id.as_deref(), Some("t1"));
        assert_eq!(o2.terminal_id.as_deref(), Some("t2"));

        // A third session finds the pool empty.
        let third = session(
            Provider::Claude,
            "7ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "/p",
            5_000,
        );
        assert_eq!(coordinator.associate_single_session(&third), AssociationOutcome::miss());
    }

    // ── 7. Bind rejection yields a plain miss ────────────────────

    #[test]
    fn bind_rejection_is_reported_not_raised() {
        let (registry, coordinator) = setup();
        registry.register_terminal("t1", Provider::Claude, "/p", 1_000);
        // The session is already owned by a terminal the pool no longer
        // tracks, so the coordinator picks t1 and the bind is rejected.
        registry
            .bind_session("t0", Provider::Claude, CLAUDE_UUID)
            .expect("bind");

        let outcome =
            coordinator.associate_single_session(&session(Provider::Claude, CLAUDE_UUID, "/p", 2_000));
        assert_eq!(outcome, AssociationOutcome::miss());

        // Ownership unchanged, t1 still free.
        let authority = registry.authority();
        let authority = authority.lock().expect("test");
        assert_eq!(
            authority.owner_for_session(Provider::Claude, CLAUDE_UUID),
            Some("t0")
        );
    }
}
