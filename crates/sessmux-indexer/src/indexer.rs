//! Debounced filesystem indexer.
//!
//! Owns one watcher per provider root plus the meta cache, the session
//! map, the project map, and the file-path ↔ session-key mapping. A single
//! writer serializes all scans; readers get immutable snapshots.
//!
//! Locking discipline: the state mutex is never held across file I/O.
//! Scans stat and read outside the lock, then commit under it; a re-stat
//! after reading detects files that changed mid-read. Watcher callbacks
//! only enqueue paths — the debounce task is the sole caller of the
//! single-file update.
//!
//! Notification order per committed scan: map mutations, then `on_update`
//! (only when the exposed state changed), then removed-session handlers,
//! then `on_new_session` per new session in `updated_at` ascending order.
//! Handlers that panic are logged and isolated.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use notify::{RecursiveMode, Watcher};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use sessmux_core::overrides::{SessionOverride, apply_override};
use sessmux_core::paths::normalize_path;
use sessmux_core::types::{Project, SessionKey, SessionRecord, sort_projects, sort_sessions};
use sessmux_providers::{PARSE_BYTE_BUDGET, ParsedMeta, SessionProvider};

use crate::config::IndexerConfig;
use crate::debounce::DebounceMap;
use crate::meta_cache::FileMetaCache;
use crate::seen::SeenSessions;

// ─── Override Source ─────────────────────────────────────────────

/// Supplies the current user-facing overrides, consulted once per scan.
pub trait OverrideSource: Send + Sync {
    fn overrides(&self) -> HashMap<SessionKey, SessionOverride>;
}

/// The empty override set.
pub struct NoOverrides;

impl OverrideSource for NoOverrides {
    fn overrides(&self) -> HashMap<SessionKey, SessionOverride> {
        HashMap::new()
    }
}

// ─── Subscriptions ───────────────────────────────────────────────

pub type UpdateHandler = Arc<dyn Fn(&[Project]) + Send + Sync>;
pub type RemovedHandler = Arc<dyn Fn(&[SessionKey]) + Send + Sync>;
pub type NewSessionHandler = Arc<dyn Fn(&SessionRecord) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubKind {
    Update,
    Removed,
    NewSession,
}

/// Handle returned by the `on_*` registrations; pass to
/// [`Indexer::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    kind: SubKind,
    id: u64,
}

#[derive(Default)]
struct Subscriptions {
    next_id: u64,
    update: Vec<(u64, UpdateHandler)>,
    removed: Vec<(u64, RemovedHandler)>,
    new_session: Vec<(u64, NewSessionHandler)>,
}

// ─── State ───────────────────────────────────────────────────────

struct IndexerState {
    initialized: bool,
    cache: FileMetaCache,
    /// Raw records keyed by session — overrides are applied at exposure.
    sessions: HashMap<SessionKey, SessionRecord>,
    /// Normalized file path → session key, one-to-one.
    files: HashMap<String, SessionKey>,
    /// First-observed `created_at` per live session key.
    pinned_created: HashMap<SessionKey, i64>,
    /// Keys present in the last exposed state.
    known: HashSet<SessionKey>,
    seen: SeenSessions,
    refresh_inflight: bool,
    refresh_queued: bool,
}

#[derive(Default)]
struct RuntimeHandles {
    watchers: Vec<notify::RecommendedWatcher>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

struct Inner {
    config: IndexerConfig,
    providers: Vec<Arc<dyn SessionProvider>>,
    overrides: Box<dyn OverrideSource>,
    state: Mutex<IndexerState>,
    /// Published snapshot; `get_projects` reads this without touching the
    /// scan state, so handlers re-entering it observe committed state.
    exposed: RwLock<Arc<Vec<Project>>>,
    subs: StdMutex<Subscriptions>,
    runtime: StdMutex<RuntimeHandles>,
}

// ─── Indexer ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Indexer {
    inner: Arc<Inner>,
}

impl Indexer {
    pub fn new(providers: Vec<Arc<dyn SessionProvider>>, config: IndexerConfig) -> Self {
        Self::with_overrides(providers, config, Box::new(NoOverrides))
    }

    pub fn with_overrides(
        providers: Vec<Arc<dyn SessionProvider>>,
        config: IndexerConfig,
        overrides: Box<dyn OverrideSource>,
    ) -> Self {
        let seen = SeenSessions::new(config.seen_retention_ms, config.seen_cap);
        Self {
            inner: Arc::new(Inner {
                config,
                providers,
                overrides,
                state: Mutex::new(IndexerState {
                    initialized: false,
                    cache: FileMetaCache::new(),
                    sessions: HashMap::new(),
                    files: HashMap::new(),
                    pinned_created: HashMap::new(),
                    known: HashSet::new(),
                    seen,
                    refresh_inflight: false,
                    refresh_queued: false,
                }),
                exposed: RwLock::new(Arc::new(Vec::new())),
                subs: StdMutex::new(Subscriptions::default()),
                runtime: StdMutex::new(RuntimeHandles::default()),
            }),
        }
    }

    /// Initial full scan (silent — it seeds the known-session set), then
    /// watchers open and the indexer is initialized.
    pub async fn start(&self) {
        self.refresh().await;
        {
            let mut st = self.inner.state.lock().await;
            st.initialized = true;
        }
        self.spawn_watchers();
    }

    /// Close watchers and abort the debounce task. Idempotent; scans
    /// already in flight run to completion.
    pub fn stop(&self) {
        let mut runtime = self.inner.runtime.lock().expect("runtime lock poisoned");
        runtime.watchers.clear();
        for task in runtime.tasks.drain(..) {
            task.abort();
        }
    }

    /// Full scan. Concurrent calls coalesce: while one refresh is in
    /// flight, any number of further calls collapse into exactly one
    /// follow-up scan.
    pub async fn refresh(&self) {
        {
            let mut st = self.inner.state.lock().await;
            if st.refresh_inflight {
                st.refresh_queued = true;
                return;
            }
            st.refresh_inflight = true;
        }
        loop {
            full_scan(&self.inner).await;
            let mut st = self.inner.state.lock().await;
            if st.refresh_queued {
                st.refresh_queued = false;
                continue;
            }
            st.refresh_inflight = false;
            break;
        }
    }

    /// Debounced single-file update, also the direct entry point for
    /// embedders driving events themselves.
    pub async fn apply_path_event(&self, path: &Path) {
        apply_path_event(&self.inner, path).await;
    }

    /// Snapshot of the exposed project groups.
    pub fn get_projects(&self) -> Arc<Vec<Project>> {
        self.inner.exposed.read().expect("exposed lock poisoned").clone()
    }

    pub async fn file_path_for_session(&self, key: &SessionKey) -> Option<PathBuf> {
        let st = self.inner.state.lock().await;
        st.sessions.get(key).map(|rec| rec.source_file.clone())
    }

    pub async fn initialized(&self) -> bool {
        self.inner.state.lock().await.initialized
    }

    pub fn on_update(&self, handler: impl Fn(&[Project]) + Send + Sync + 'static) -> Subscription {
        let mut subs = self.inner.subs.lock().expect("subs lock poisoned");
        let id = subs.next_id;
        subs.next_id += 1;
        subs.update.push((id, Arc::new(handler)));
        Subscription {
            kind: SubKind::Update,
            id,
        }
    }

    /// Keys that dropped out of the exposed state on the last commit.
    /// Fired between `on_update` and `on_new_session`; the wiring layer
    /// uses this to revoke bindings for destroyed sessions.
    pub fn on_session_removed(
        &self,
        handler: impl Fn(&[SessionKey]) + Send + Sync + 'static,
    ) -> Subscription {
        let mut subs = self.inner.subs.lock().expect("subs lock poisoned");
        let id = subs.next_id;
        subs.next_id += 1;
        subs.removed.push((id, Arc::new(handler)));
        Subscription {
            kind: SubKind::Removed,
            id,
        }
    }

    pub fn on_new_session(
        &self,
        handler: impl Fn(&SessionRecord) + Send + Sync + 'static,
    ) -> Subscription {
        let mut subs = self.inner.subs.lock().expect("subs lock poisoned");
        let id = subs.next_id;
        subs.next_id += 1;
        subs.new_session.push((id, Arc::new(handler)));
        Subscription {
            kind: SubKind::NewSession,
            id,
        }
    }

    pub fn unsubscribe(&self, sub: Subscription) {
        let mut subs = self.inner.subs.lock().expect("subs lock poisoned");
        match sub.kind {
            SubKind::Update => subs.update.retain(|(id, _)| *id != sub.id),
            SubKind::Removed => subs.removed.retain(|(id, _)| *id != sub.id),
            SubKind::NewSession => subs.new_session.retain(|(id, _)| *id != sub.id),
        }
    }

    fn spawn_watchers(&self) {
        let mut runtime = self.inner.runtime.lock().expect("runtime lock poisoned");
        if !runtime.tasks.is_empty() {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();
        for provider in &self.inner.providers {
            let Some(root) = provider.watch_root() else {
                continue;
            };
            if !root.is_dir() {
                debug!(root = %root.display(), "provider root absent, not watching");
                continue;
            }
            let tx = tx.clone();
            let watcher =
                notify::recommended_watcher(move |result: Result<notify::Event, notify::Error>| {
                    match result {
                        Ok(event) => {
                            for path in event.paths {
                                let _ = tx.send(path);
                            }
                        }
                        Err(e) => warn!(error = %e, "filesystem watch error"),
                    }
                });
            match watcher {
                Ok(mut watcher) => match watcher.watch(&root, RecursiveMode::Recursive) {
                    Ok(()) => runtime.watchers.push(watcher),
                    Err(e) => {
                        warn!(root = %root.display(), error = %e, "failed to watch provider root");
                    }
                },
                Err(e) => warn!(error = %e, "failed to create filesystem watcher"),
            }
        }

        let inner = Arc::clone(&self.inner);
        runtime.tasks.push(tokio::spawn(debounce_loop(inner, rx)));
    }
}

// ─── Debounce Loop ───────────────────────────────────────────────

async fn debounce_loop(inner: Arc<Inner>, mut rx: mpsc::UnboundedReceiver<PathBuf>) {
    let window = Duration::from_millis(inner.config.debounce_ms);
    let mut pending = DebounceMap::new(window);
    let tick = Duration::from_millis((inner.config.debounce_ms / 4).clamp(10, 50));
    let mut ticker = tokio::time::interval(tick);

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(path) => {
                        if inner.providers.iter().any(|p| p.owns_path(&path)) {
                            pending.note(path, Instant::now());
                        }
                    }
                    // All watchers dropped — the indexer is stopping.
                    None => break,
                }
            }
            _ = ticker.tick() => {
                for path in pending.due(Instant::now()) {
                    apply_path_event(&inner, &path).await;
                }
            }
        }
    }
}

// ─── Scans ───────────────────────────────────────────────────────

struct Candidate {
    provider_idx: usize,
    path: PathBuf,
    norm: String,
    stat: FileStat,
}

async fn full_scan(inner: &Arc<Inner>) {
    // Enumerate + stat, no state lock held.
    let mut candidates = Vec::new();
    for (provider_idx, provider) in inner.providers.iter().enumerate() {
        for path in provider.list_session_files() {
            match stat_file(&path) {
                Some(stat) => candidates.push(Candidate {
                    provider_idx,
                    norm: normalize_path(&path.to_string_lossy()),
                    path,
                    stat,
                }),
                None => warn!(path = %path.display(), "stat failed during scan, skipping"),
            }
        }
    }

    let overrides = inner.overrides.overrides();

    // Cache consult under a short lock.
    let mut metas: Vec<Option<Option<ParsedMeta>>> = {
        let st = inner.state.lock().await;
        candidates
            .iter()
            .map(|c| st.cache.lookup(&c.norm, c.stat.mtime_ms, c.stat.size).cloned())
            .collect()
    };

    // Parse stale files, lock released.
    let mut fresh: Vec<(usize, FileStat, Option<ParsedMeta>)> = Vec::new();
    for (i, meta) in metas.iter().enumerate() {
        if meta.is_some() {
            continue;
        }
        let candidate = &candidates[i];
        let provider = &inner.providers[candidate.provider_idx];
        if let Some((stat, parsed)) = read_and_parse(provider.as_ref(), &candidate.path) {
            fresh.push((i, stat, parsed));
        }
        // A vanished file keeps metas[i] == None and is dropped below.
    }

    // Commit.
    let now = now_ms();
    let mut st = inner.state.lock().await;
    for (i, stat, parsed) in fresh {
        st.cache
            .insert(&candidates[i].norm, stat.mtime_ms, stat.size, parsed.clone());
        candidates[i].stat = stat;
        metas[i] = Some(parsed);
    }

    let mut sessions: HashMap<SessionKey, SessionRecord> = HashMap::new();
    let mut files: HashMap<String, SessionKey> = HashMap::new();
    let mut live_paths: HashSet<String> = HashSet::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let Some(Some(meta)) = &metas[i] else {
            // Vanished mid-scan, or orphaned (no cwd).
            if matches!(metas[i], Some(None)) {
                live_paths.insert(candidate.norm.clone());
            }
            continue;
        };
        live_paths.insert(candidate.norm.clone());

        let provider = &inner.providers[candidate.provider_idx];
        let Some(record) =
            build_record(provider.as_ref(), &candidate.path, meta, candidate.stat, &st.pinned_created)
        else {
            continue;
        };

        let key = record.key.clone();
        // Two files claiming one key: the newer transcript wins and the
        // file mapping stays one-to-one.
        let replace = sessions
            .get(&key)
            .is_none_or(|existing| record.updated_at_ms > existing.updated_at_ms);
        if replace {
            files.retain(|_, mapped| *mapped != key);
            files.insert(candidate.norm.clone(), key.clone());
            sessions.insert(key, record);
        }
    }

    st.pinned_created = sessions
        .iter()
        .map(|(key, rec)| (key.clone(), rec.created_at_ms))
        .collect();
    st.sessions = sessions;
    st.files = files;
    st.cache.retain_paths(&live_paths);

    let outcome = commit_exposure(inner, &mut st, &overrides, now);
    drop(st);
    notify_handlers(inner, outcome);
}

async fn apply_path_event(inner: &Arc<Inner>, path: &Path) {
    let Some(provider) = inner.providers.iter().find(|p| p.owns_path(path)).cloned() else {
        return;
    };
    let norm = normalize_path(&path.to_string_lossy());
    let overrides = inner.overrides.overrides();
    let now = now_ms();

    // Stat + read + parse outside the lock.
    let parsed = read_and_parse(provider.as_ref(), path);

    let mut st = inner.state.lock().await;
    let prev_key = st.files.get(&norm).cloned();

    match parsed {
        None => {
            // Unlinked (or unreadable): removal keyed strictly by the
            // file-path mapping, never by guessing an id from the name.
            st.cache.remove(&norm);
            let Some(key) = prev_key else {
                return;
            };
            debug!(path = %path.display(), key = %key, "transcript gone, removing session");
            st.files.remove(&norm);
            remove_session(&mut st, &key);
        }
        Some((stat, parsed_meta)) => {
            st.cache
                .insert(&norm, stat.mtime_ms, stat.size, parsed_meta.clone());
            let record = parsed_meta
                .as_ref()
                .and_then(|meta| build_record(provider.as_ref(), path, meta, stat, &st.pinned_created));
            match record {
                Some(record) => {
                    let key = record.key.clone();
                    if let Some(old) = prev_key
                        && old != key
                    {
                        // Embedded id changed: the old session is removed
                        // before the new one registers.
                        remove_session(&mut st, &old);
                    }
                    // A rename leaves a stale mapping on the old path.
                    st.files.retain(|p, mapped| !(*mapped == key && *p != norm));
                    st.files.insert(norm.clone(), key.clone());
                    st.pinned_created
                        .entry(key.clone())
                        .or_insert(record.created_at_ms);
                    let mut record = record;
                    record.created_at_ms = st.pinned_created[&key];
                    st.sessions.insert(key, record);
                }
                None => {
                    // Orphaned or no valid id: drop whatever was here.
                    st.files.remove(&norm);
                    if let Some(old) = prev_key {
                        remove_session(&mut st, &old);
                    }
                }
            }
        }
    }

    let outcome = commit_exposure(inner, &mut st, &overrides, now);
    drop(st);
    notify_handlers(inner, outcome);
}

fn remove_session(st: &mut IndexerState, key: &SessionKey) {
    st.sessions.remove(key);
    st.pinned_created.remove(key);
    st.files.retain(|_, mapped| *mapped != *key);
}

fn build_record(
    provider: &dyn SessionProvider,
    path: &Path,
    meta: &ParsedMeta,
    stat: FileStat,
    pinned: &HashMap<SessionKey, i64>,
) -> Option<SessionRecord> {
    let cwd = meta.cwd.clone()?;
    let id = provider.extract_session_id(path, meta)?;
    let key = SessionKey::new(provider.kind(), id);
    let computed_created = meta.created_at_ms.unwrap_or(stat.birth_ms);
    let created_at_ms = pinned.get(&key).copied().unwrap_or(computed_created);
    Some(SessionRecord {
        key,
        project_path: provider
            .resolve_project_path(path, meta)
            .unwrap_or_else(|| cwd.clone()),
        cwd,
        updated_at_ms: stat.mtime_ms,
        created_at_ms,
        message_count: meta.message_count,
        title: meta.title.clone(),
        summary: meta.summary.clone(),
        archived: false,
        source_file: path.to_path_buf(),
    })
}

// ─── Exposure Commit ─────────────────────────────────────────────

struct ScanOutcome {
    changed: bool,
    projects: Arc<Vec<Project>>,
    new_sessions: Vec<SessionRecord>,
    removed: Vec<SessionKey>,
}

/// Apply overrides, group, sort, publish the snapshot, and reconcile the
/// known/seen sets. Runs under the state lock; handlers fire afterwards.
fn commit_exposure(
    inner: &Inner,
    st: &mut IndexerState,
    overrides: &HashMap<SessionKey, SessionOverride>,
    now_ms: i64,
) -> ScanOutcome {
    let mut by_project: HashMap<String, Vec<SessionRecord>> = HashMap::new();
    for record in st.sessions.values() {
        let exposed = match overrides.get(&record.key) {
            Some(ov) => match apply_override(record, ov) {
                Some(merged) => merged,
                None => continue,
            },
            None => record.clone(),
        };
        by_project
            .entry(exposed.project_path.clone())
            .or_default()
            .push(exposed);
    }

    let mut projects: Vec<Project> = by_project
        .into_iter()
        .map(|(path, mut sessions)| {
            sort_sessions(&mut sessions);
            Project {
                path,
                sessions,
                color: None,
            }
        })
        .collect();
    sort_projects(&mut projects);

    let exposed_keys: HashSet<SessionKey> = projects
        .iter()
        .flat_map(|p| p.sessions.iter().map(|s| s.key.clone()))
        .collect();

    let mut new_sessions: Vec<SessionRecord> = if st.initialized {
        projects
            .iter()
            .flat_map(|p| &p.sessions)
            .filter(|s| !st.known.contains(&s.key) && !st.seen.contains(&s.key))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };
    new_sessions.sort_by(|a, b| {
        a.updated_at_ms
            .cmp(&b.updated_at_ms)
            .then_with(|| a.key.cmp(&b.key))
    });

    let mut removed: Vec<SessionKey> = st.known.difference(&exposed_keys).cloned().collect();
    removed.sort();

    st.known = exposed_keys;
    let touched: Vec<SessionKey> = st.known.iter().cloned().collect();
    for key in &touched {
        st.seen.touch(key, now_ms);
    }
    st.seen.prune(now_ms);

    let projects = Arc::new(projects);
    let previous = inner
        .exposed
        .read()
        .expect("exposed lock poisoned")
        .clone();
    let changed = *previous != *projects;
    *inner.exposed.write().expect("exposed lock poisoned") = projects.clone();

    ScanOutcome {
        changed,
        projects,
        new_sessions,
        removed,
    }
}

fn notify_handlers(inner: &Inner, outcome: ScanOutcome) {
    if outcome.changed {
        let handlers: Vec<UpdateHandler> = {
            let subs = inner.subs.lock().expect("subs lock poisoned");
            subs.update.iter().map(|(_, h)| h.clone()).collect()
        };
        for handler in handlers {
            let projects = outcome.projects.as_slice();
            if std::panic::catch_unwind(AssertUnwindSafe(|| handler(projects))).is_err() {
                warn!("update handler panicked");
            }
        }
    }

    if !outcome.removed.is_empty() {
        let handlers: Vec<RemovedHandler> = {
            let subs = inner.subs.lock().expect("subs lock poisoned");
            subs.removed.iter().map(|(_, h)| h.clone()).collect()
        };
        for handler in handlers {
            let removed = outcome.removed.as_slice();
            if std::panic::catch_unwind(AssertUnwindSafe(|| handler(removed))).is_err() {
                warn!("removed-session handler panicked");
            }
        }
    }

    if !outcome.new_sessions.is_empty() {
        let handlers: Vec<NewSessionHandler> = {
            let subs = inner.subs.lock().expect("subs lock poisoned");
            subs.new_session.iter().map(|(_, h)| h.clone()).collect()
        };
        for session in &outcome.new_sessions {
            for handler in &handlers {
                if std::panic::catch_unwind(AssertUnwindSafe(|| handler(session))).is_err() {
                    warn!(key = %session.key, "new-session handler panicked");
                }
            }
        }
    }
}

// ─── File I/O ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStat {
    mtime_ms: i64,
    size: u64,
    birth_ms: i64,
}

fn stat_file(path: &Path) -> Option<FileStat> {
    let meta = std::fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }
    let mtime_ms = system_time_ms(meta.modified().ok()).unwrap_or(0);
    let birth_ms = system_time_ms(meta.created().ok())
        .or_else(|| ctime_ms(&meta))
        .unwrap_or(mtime_ms);
    Some(FileStat {
        mtime_ms,
        size: meta.len(),
        birth_ms,
    })
}

fn system_time_ms(time: Option<SystemTime>) -> Option<i64> {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
}

#[cfg(unix)]
fn ctime_ms(meta: &std::fs::Metadata) -> Option<i64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ctime() * 1_000 + meta.ctime_nsec() / 1_000_000)
}

#[cfg(not(unix))]
fn ctime_ms(_meta: &std::fs::Metadata) -> Option<i64> {
    None
}

/// Stat → read → re-stat. A file that changed between the stats is read
/// again once; after that the latest read is accepted — the next change
/// event re-parses anyway. `None` means the file is gone or unreadable.
/// The parsed meta is `None` when the transcript has no cwd (orphan).
fn read_and_parse(
    provider: &dyn SessionProvider,
    path: &Path,
) -> Option<(FileStat, Option<ParsedMeta>)> {
    let mut stat = stat_file(path)?;
    for attempt in 0..2 {
        let bytes = match read_head(path, PARSE_BYTE_BUDGET) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read transcript");
                return None;
            }
        };
        let after = stat_file(path)?;
        let stable = after.mtime_ms == stat.mtime_ms && after.size == stat.size;
        stat = after;
        if stable || attempt == 1 {
            let meta = provider.parse_session_file(&bytes, path);
            let meta = if meta.cwd.is_some() { Some(meta) } else { None };
            return Some((stat, meta));
        }
    }
    unreachable!("loop returns on the second attempt");
}

fn read_head(path: &Path, budget: usize) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let file = std::fs::File::open(path)?;
    let mut buf = Vec::new();
    file.take(budget as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn now_ms() -> i64 {
    system_time_ms(Some(SystemTime::now())).unwrap_or(0)
}

// ─── Tests ───────────────────────────────────────────────────────
