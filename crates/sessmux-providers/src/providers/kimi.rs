//! Kimi CLI provider: `{home}/sessions/**/*.jsonl`. Kimi's CLI has no
//! resume argument, so its sessions are indexed but never bound.

use std::path::PathBuf;

use sessmux_core::types::Provider;

use crate::{SessionProvider, collect_jsonl, home_with_env};

pub struct Kimi {
    home: Option<PathBuf>,
}

impl Kimi {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl Default for Kimi {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Kimi {
    fn kind(&self) -> Provider {
        Provider::Kimi
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        home_with_env("KIMI_HOME", ".kimi")
    }

    fn watch_root(&self) -> Option<PathBuf> {
        self.home_dir().map(|h| h.join("sessions"))
    }

    fn list_session_files(&self) -> Vec<PathBuf> {
        self.watch_root()
            .map(|dir| collect_jsonl(&dir, |_| true))
            .unwrap_or_default()
    }

    fn is_valid_session_id(&self, id: &str) -> bool {
        !id.trim().is_empty()
    }
}
