//! Filesystem-watching session indexer.
//!
//! Maintains the live project/session model: a full scan seeds it, a
//! notify watcher plus per-path debounce keeps it current, and a
//! `(mtime, size)` meta cache makes unchanged files free to re-scan.
//! Downstream consumers subscribe to update / removed / new-session
//! notifications and read immutable snapshots.

pub mod config;
mod debounce;
pub mod indexer;
pub mod meta_cache;
pub mod seen;

pub use config::IndexerConfig;
pub use indexer::{Indexer, NoOverrides, OverrideSource, Subscription};
