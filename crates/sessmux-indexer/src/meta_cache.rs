//! `(mtime, size)`-keyed memoization of parsed transcript metadata.
//!
//! Keys are normalized file paths. A cached `meta: None` means "scanned
//! but unusable — no cwd" and short-circuits identically to a hit with
//! metadata, so orphaned files are not re-parsed on every scan. Entries
//! for files absent from the current full scan are evicted.

use std::collections::{HashMap, HashSet};

use sessmux_providers::ParsedMeta;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub mtime_ms: i64,
    pub size: u64,
    pub meta: Option<ParsedMeta>,
}

#[derive(Debug, Default)]
pub struct FileMetaCache {
    entries: HashMap<String, CacheEntry>,
}

impl FileMetaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached parse result, valid only while `(mtime, size)` match.
    pub fn lookup(&self, path: &str, mtime_ms: i64, size: u64) -> Option<&Option<ParsedMeta>> {
        self.entries
            .get(path)
            .filter(|e| e.mtime_ms == mtime_ms && e.size == size)
            .map(|e| &e.meta)
    }

    pub fn insert(&mut self, path: &str, mtime_ms: i64, size: u64, meta: Option<ParsedMeta>) {
        self.entries.insert(
            path.to_owned(),
            CacheEntry {
                mtime_ms,
                size,
                meta,
            },
        );
    }

    pub fn remove(&mut self, path: &str) {
        self.entries.remove(path);
    }

    /// Evict entries for files not seen in the current full scan.
    pub fn retain_paths(&mut self, live: &HashSet<String>) {
        self.entries.retain(|path, _| live.contains(path));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
