//! Gemini CLI provider: per-workspace hash directories under
//! `{home}/tmp/<hash>/chats/`, one transcript per session.

use std::path::PathBuf;

use sessmux_core::types::Provider;

use crate::{SessionProvider, collect_jsonl, home_with_env};

pub struct Gemini {
    home: Option<PathBuf>,
}

impl Gemini {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl Default for Gemini {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Gemini {
    fn kind(&self) -> Provider {
        Provider::Gemini
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        home_with_env("GEMINI_HOME", ".gemini")
    }

    fn watch_root(&self) -> Option<PathBuf> {
        self.home_dir().map(|h| h.join("tmp"))
    }

    fn list_session_files(&self) -> Vec<PathBuf> {
        self.watch_root()
            .map(|dir| {
                collect_jsonl(&dir, |path| {
                    path.parent()
                        .and_then(|parent| parent.file_name())
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name == "chats")
                })
            })
            .unwrap_or_default()
    }

    fn is_valid_session_id(&self, id: &str) -> bool {
        !id.trim().is_empty()
    }
}
