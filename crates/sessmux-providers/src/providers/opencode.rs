//! OpenCode provider: `{home}/sessions/**/*.jsonl`, filename-stem ids.

use std::path::PathBuf;

use sessmux_core::types::Provider;

use crate::{SessionProvider, collect_jsonl, home_with_env};

pub struct OpenCode {
    home: Option<PathBuf>,
}

impl OpenCode {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl Default for OpenCode {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for OpenCode {
    fn kind(&self) -> Provider {
        Provider::Opencode
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        home_with_env("OPENCODE_HOME", ".opencode")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedMeta;
    use std::fs;
    use std::path::Path;

    #[test]
    fn filename_stem_is_the_id() {
        let provider = OpenCode::new();
        let id = provider
            .extract_session_id(Path::new("/x/sessions/ses_abc123.jsonl"), &ParsedMeta::default());
        assert_eq!(id.as_deref(), Some("ses_abc123"));
    }

    #[test]
    fn lists_sessions_dir() {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("test")
            .as_nanos();
        let home = std::env::temp_dir().join(format!("sessmux-test-opencode-{nonce}"));
        fs::create_dir_all(home.join("sessions/deep")).expect("test");
        fs::write(home.join("sessions/deep/ses_1.jsonl"), "{}\n").expect("test");

        let provider = OpenCode::with_home(&home);
        assert_eq!(provider.list_session_files().len(), 1);
        assert!(provider.supports_resume());

        let _ = fs::remove_dir_all(&home);
    }
}
