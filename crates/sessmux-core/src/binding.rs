//! Session↔terminal binding authority.
//!
//! Holds the authoritative mapping between composite session keys and
//! terminal ids, enforcing a bijection on its domain:
//!
//! - a session key maps to at most one terminal
//! - a terminal maps to at most one session key
//! - first writer wins; re-binding the same pair is an idempotent success
//!
//! Operations are synchronous and never fail with an error: rejected binds
//! come back as typed [`BindReject`] reasons, and a rejection leaves both
//! maps untouched. Callers serialize access (the host wraps the authority
//! in whatever mutual exclusion it uses).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Provider, SessionKey};

// ─── Bind Result ─────────────────────────────────────────────────

/// Typed rejection reasons — the only failure channel for `bind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum BindReject {
    /// The session key is already owned by a different terminal.
    SessionAlreadyOwned { owner: String },
    /// The terminal is already bound to a different session key.
    TerminalAlreadyBound { session: SessionKey },
}

pub type BindResult = Result<(), BindReject>;

// ─── Binding Authority ───────────────────────────────────────────

/// In-memory bijective registry of session↔terminal bindings.
#[derive(Debug, Default, Clone)]
pub struct BindingAuthority {
    by_session: HashMap<SessionKey, String>,
    by_terminal: HashMap<String, SessionKey>,
}

impl BindingAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a session to a terminal.
    ///
    /// - Same pair already bound → `Ok(())` (idempotent).
    /// - Session owned by another terminal → `SessionAlreadyOwned`.
    /// - Terminal bound to another session → `TerminalAlreadyBound`.
    /// - Otherwise both directions are inserted atomically.
    pub fn bind(&mut self, provider: Provider, session_id: &str, terminal_id: &str) -> BindResult {
        let key = SessionKey::new(provider, session_id);

        if let Some(owner) = self.by_session.get(&key) {
            if owner == terminal_id {
                return Ok(());
            }
            return Err(BindReject::SessionAlreadyOwned {
                owner: owner.clone(),
            });
        }

        if let Some(existing) = self.by_terminal.get(terminal_id)
            && *existing != key
        {
            return Err(BindReject::TerminalAlreadyBound {
                session: existing.clone(),
            });
        }

        self.by_session.insert(key.clone(), terminal_id.to_owned());
        self.by_terminal.insert(terminal_id.to_owned(), key);
        Ok(())
    }

    /// Terminal currently owning the session, if any.
    pub fn owner_for_session(&self, provider: Provider, session_id: &str) -> Option<&str> {
        self.by_session
            .get(&SessionKey::new(provider, session_id))
            .map(String::as_str)
    }

    /// Session currently bound to the terminal, if any.
    pub fn session_for_terminal(&self, terminal_id: &str) -> Option<&SessionKey> {
        self.by_terminal.get(terminal_id)
    }

    /// Remove the binding for a terminal. Returns the cleared session key,
    /// or `None` if the terminal was not bound.
    pub fn unbind_terminal(&mut self, terminal_id: &str) -> Option<SessionKey> {
        let key = self.by_terminal.remove(terminal_id)?;
        self.by_session.remove(&key);
        Some(key)
    }

    /// Remove the binding for a session key, both directions. Used when a
    /// terminal process exits and the caller no longer knows its id.
    /// Returns the cleared terminal id, or `None` if unbound.
    pub fn clear_session_owner(&mut self, provider: Provider, session_id: &str) -> Option<String> {
        let key = SessionKey::new(provider, session_id);
        let terminal = self.by_session.remove(&key)?;
        self.by_terminal.remove(&terminal);
        Some(terminal)
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.by_session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_session.is_empty()
    }

    /// Check the bijection invariant. Test support.
    #[cfg(test)]
    fn assert_bijective(&self) {
        assert_eq!(self.by_session.len(), self.by_terminal.len());
        for (key, terminal) in &self.by_session {
            assert_eq!(
                self.by_terminal.get(terminal),
                Some(key),
                "by_terminal[{terminal}] must point back at {key}"
            );
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────
