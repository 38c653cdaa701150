//! Terminal registry seam.
//!
//! The PTY layer owns terminal lifecycle; the coordinator only needs two
//! things from it: the running, unbound terminals matching a provider and
//! cwd, and a bind delegate. The in-memory implementation here backs the
//! runtime wiring and the end-to-end tests; a real PTY registry plugs in
//! behind the same trait.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use sessmux_core::binding::{BindResult, BindingAuthority};
use sessmux_core::paths::normalize_path;
use sessmux_core::types::Provider;

/// A terminal eligible for association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCandidate {
    pub terminal_id: String,
    pub created_at_ms: i64,
}

/// What the coordinator needs from the terminal registry.
pub trait AssociationRegistry: Send + Sync {
    /// Running, unbound terminals spawned for `provider` whose working
    /// directory matches `cwd` after normalization — oldest first.
    fn find_unassociated_terminals(&self, provider: Provider, cwd: &str) -> Vec<TerminalCandidate>;

    /// Bind a session to a terminal; delegates to the binding authority.
    fn bind_session(&self, terminal_id: &str, provider: Provider, session_id: &str) -> BindResult;
}

// ─── In-Memory Registry ──────────────────────────────────────────

#[derive(Debug, Clone)]
struct TerminalEntry {
    terminal_id: String,
    provider: Provider,
    cwd: String,
    created_at_ms: i64,
    running: bool,
}

/// Simple registry of provider-mode terminals sharing one binding
/// authority with the rest of the system.
pub struct InMemoryTerminalRegistry {
    terminals: Mutex<Vec<TerminalEntry>>,
    authority: Arc<Mutex<BindingAuthority>>,
}

impl InMemoryTerminalRegistry {
    pub fn new(authority: Arc<Mutex<BindingAuthority>>) -> Self {
        Self {
            terminals: Mutex::new(Vec::new()),
            authority,
        }
    }

    pub fn authority(&self) -> Arc<Mutex<BindingAuthority>> {
        Arc::clone(&self.authority)
    }

    /// Register a running terminal spawned to run `provider` in `cwd`.
    pub fn register_terminal(
        &self,
        terminal_id: &str,
        provider: Provider,
        cwd: &str,
        created_at_ms: i64,
    ) {
        let mut terminals = self.terminals.lock().expect("terminals lock poisoned");
        terminals.retain(|t| t.terminal_id != terminal_id);
        terminals.push(TerminalEntry {
            terminal_id: terminal_id.to_owned(),
            provider,
            cwd: normalize_path(cwd),
            created_at_ms,
            running: true,
        });
    }

    /// The terminal's process exited: it leaves the pool and releases any
    /// binding it held.
    pub fn remove_terminal(&self, terminal_id: &str) {
        self.terminals
            .lock()
            .expect("terminals lock poisoned")
            .retain(|t| t.terminal_id != terminal_id);
        self.authority
            .lock()
            .expect("authority lock poisoned")
            .unbind_terminal(terminal_id);
    }

    pub fn len(&self) -> usize {
        self.terminals.lock().expect("terminals lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssociationRegistry for InMemoryTerminalRegistry {
    fn find_unassociated_terminals(&self, provider: Provider, cwd: &str) -> Vec<TerminalCandidate> {
        let wanted = normalize_path(cwd);
        let authority = self.authority.lock().expect("authority lock poisoned");
        let mut matches: Vec<TerminalCandidate> = self
            .terminals
            .lock()
            .expect("terminals lock poisoned")
            .iter()
            .filter(|t| {
                t.running
                    && t.provider == provider
                    && t.cwd == wanted
                    && authority.session_for_terminal(&t.terminal_id).is_none()
            })
            .map(|t| TerminalCandidate {
                terminal_id: t.terminal_id.clone(),
                created_at_ms: t.created_at_ms,
            })
            .collect();
        matches.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.terminal_id.cmp(&b.terminal_id))
        });
        matches
    }

    fn bind_session(&self, terminal_id: &str, provider: Provider, session_id: &str) -> BindResult {
        self.authority
            .lock()
            .expect("authority lock poisoned")
            .bind(provider, session_id, terminal_id)
    }
}

// ─── Tests ───────────────────────────────────────────────────────
