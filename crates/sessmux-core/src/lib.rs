//! Core data model and pure components for the session index:
//! provider tags, session keys and records, project grouping, the
//! session↔terminal binding authority, override application, and the
//! path / system-context utilities shared by every layer above.
//!
//! Nothing in this crate performs I/O except the git-root walker in
//! [`paths`], which reads `.git` entries on demand and caches the result.

pub mod binding;
pub mod error;
pub mod overrides;
pub mod paths;
pub mod syscontext;
pub mod types;

pub use error::Error;
