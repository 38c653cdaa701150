//! Error types shared across the workspace.
//!
//! Only failures that propagate to callers live here — the string parsers
//! for provider tags and session keys. Per-file failures (unreadable
//! transcripts, invalid session ids) are policy-handled where they occur:
//! logged at warn and dropped from the scan, never raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid session key: {0:?}")]
    InvalidSessionKey(String),
}
