//! Platform-aware path helpers and git root resolution.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

// ─── Path Shape ──────────────────────────────────────────────────

/// Whether a harvested string plausibly names a filesystem path.
///
/// True for `~`, `.`, `..`, anything containing a path separator, and
/// Windows drive prefixes. URLs (`scheme://…`) are rejected.
pub fn looks_like_path(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    if let Some(idx) = s.find("://") {
        let scheme = &s[..idx];
        if !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return false;
        }
    }
    if matches!(s, "~" | "." | "..") {
        return true;
    }
    if s.contains('/') || s.contains('\\') {
        return true;
    }
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Normalize a path string for use as a map key: absolute, trailing
/// separators collapsed, case-folded on case-insensitive filesystems.
pub fn normalize_path(raw: &str) -> String {
    let path = Path::new(raw.trim());
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut s = abs.to_string_lossy().into_owned();
    while s.len() > 1 && (s.ends_with('/') || s.ends_with('\\')) {
        s.pop();
    }
    fold_case(s)
}

#[cfg(any(windows, target_os = "macos"))]
fn fold_case(s: String) -> String {
    s.to_lowercase()
}

#[cfg(not(any(windows, target_os = "macos")))]
fn fold_case(s: String) -> String {
    s
}

// ─── Git Roots ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootSemantics {
    /// Worktrees collapse to the shared repository.
    Repo,
    /// Each worktree is its own root.
    Checkout,
}

/// Cached git root resolution. Walks parents looking for a `.git` entry,
/// classifying plain repositories, submodules, and linked worktrees.
#[derive(Debug, Default)]
pub struct GitRoots {
    repo: HashMap<PathBuf, Option<PathBuf>>,
    checkout: HashMap<PathBuf, Option<PathBuf>>,
}

impl GitRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository root for `cwd`: a linked worktree resolves to the shared
    /// repository's working directory.
    pub fn repo_root(&mut self, cwd: &Path) -> Option<PathBuf> {
        if let Some(hit) = self.repo.get(cwd) {
            return hit.clone();
        }
        let resolved = resolve_root(cwd, RootSemantics::Repo);
        self.repo.insert(cwd.to_path_buf(), resolved.clone());
        resolved
    }

    /// Checkout root for `cwd`: a linked worktree resolves to its own
    /// working directory.
    pub fn checkout_root(&mut self, cwd: &Path) -> Option<PathBuf> {
        if let Some(hit) = self.checkout.get(cwd) {
            return hit.clone();
        }
        let resolved = resolve_root(cwd, RootSemantics::Checkout);
        self.checkout.insert(cwd.to_path_buf(), resolved.clone());
        resolved
    }

    /// Drop all cached resolutions.
    pub fn flush(&mut self) {
        self.repo.clear();
        self.checkout.clear();
    }
}

fn resolve_root(cwd: &Path, semantics: RootSemantics) -> Option<PathBuf> {
    for ancestor in cwd.ancestors() {
        let dot_git = ancestor.join(".git");
        let Ok(meta) = fs::symlink_metadata(&dot_git) else {
            continue;
        };
        if meta.is_dir() {
            return Some(ancestor.to_path_buf());
        }
        if meta.is_file() {
            return classify_git_file(ancestor, &dot_git, semantics);
        }
    }
    None
}

/// A `.git` file carries a `gitdir:` pointer. Its shape distinguishes
/// submodules (`/.git/modules/`) from linked worktrees (`/.git/worktrees/`).
fn classify_git_file(
    containing: &Path,
    dot_git: &Path,
    semantics: RootSemantics,
) -> Option<PathBuf> {
    let content = fs::read_to_string(dot_git).ok()?;
    let gitdir_line = content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))?
        .trim();

    let gitdir = if Path::new(gitdir_line).is_absolute() {
        PathBuf::from(gitdir_line)
    } else {
        lexical_normalize(&containing.join(gitdir_line))
    };
    let gitdir_str = gitdir.to_string_lossy().replace('\\', "/");

    if gitdir_str.contains("/.git/modules/") {
        // Submodule: treated as its own repository under both semantics.
        return Some(containing.to_path_buf());
    }

    if gitdir_str.contains("/.git/worktrees/") {
        return match semantics {
            RootSemantics::Checkout => Some(containing.to_path_buf()),
            RootSemantics::Repo => {
                let common = fs::read_to_string(gitdir.join("commondir")).ok()?;
                let common = common.trim();
                let shared_git = if Path::new(common).is_absolute() {
                    PathBuf::from(common)
                } else {
                    lexical_normalize(&gitdir.join(common))
                };
                shared_git.parent().map(Path::to_path_buf)
            }
        };
    }

    Some(containing.to_path_buf())
}

/// Resolve `.` and `..` components lexically, without touching the
/// filesystem.
fn lexical_normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in p.components() {
        match comp {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("test")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("sessmux-test-{label}-{nonce}"));
        fs::create_dir_all(&dir).expect("test");
        dir
    }

    // ── looks_like_path ──────────────────────────────────────────

    #[test]
    fn path_like_strings_accepted() {
        for s in ["~", ".", "..", "/home/u", "a/b", r"a\b", "C:", r"C:\work", "~/src"] {
            assert!(looks_like_path(s), "{s:?} should look like a path");
        }
    }

    #[test]
    fn non_paths_rejected() {
        for s in ["", "   ", "hello", "https://example.com/x", "file://etc"] {
            assert!(!looks_like_path(s), "{s:?} should not look like a path");
        }
    }

    #[test]
    fn separator_beats_weird_scheme() {
        // "://" without a plausible scheme prefix is not a URL.
        assert!(looks_like_path("a b://c/d"));
    }

    // ── normalize_path ───────────────────────────────────────────

    #[test]
    fn normalize_collapses_trailing_separators() {
        assert_eq!(normalize_path("/home/u/project///"), fold_case("/home/u/project".into()));
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn normalize_makes_relative_absolute() {
        let n = normalize_path("some/rel");
        assert!(Path::new(&n).is_absolute(), "{n}");
    }

    // ── git roots ────────────────────────────────────────────────

    #[test]
    fn plain_repo_root_found_from_subdir() {
        let tmp = unique_temp_dir("git-plain");
        let repo = tmp.join("repo");
        fs::create_dir_all(repo.join(".git")).expect("test");
        fs::create_dir_all(repo.join("src/deep")).expect("test");

        let mut roots = GitRoots::new();
        assert_eq!(roots.repo_root(&repo.join("src/deep")), Some(repo.clone()));
        assert_eq!(roots.checkout_root(&repo.join("src")), Some(repo));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_git_entry_yields_none() {
        let tmp = unique_temp_dir("git-none");
        let mut roots = GitRoots::new();
        assert_eq!(roots.repo_root(&tmp), None);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn submodule_is_its_own_root() {
        let tmp = unique_temp_dir("git-sub");
        let outer = tmp.join("outer");
        let sub = outer.join("libs/inner");
        fs::create_dir_all(outer.join(".git/modules/libs/inner")).expect("test");
        fs::create_dir_all(&sub).expect("test");
        fs::write(
            sub.join(".git"),
            "gitdir: ../../.git/modules/libs/inner\n",
        )
        .expect("test");

        let mut roots = GitRoots::new();
        assert_eq!(roots.repo_root(&sub), Some(sub.clone()));
        assert_eq!(roots.checkout_root(&sub), Some(sub));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn worktree_collapses_to_shared_repo() {
        let tmp = unique_temp_dir("git-wt");
        let main = tmp.join("main");
        let wt = tmp.join("wt");
        let wt_gitdir = main.join(".git/worktrees/wt");
        fs::create_dir_all(&wt_gitdir).expect("test");
        fs::create_dir_all(&wt).expect("test");
        fs::write(
            wt.join(".git"),
            format!("gitdir: {}\n", wt_gitdir.display()),
        )
        .expect("test");
        fs::write(wt_gitdir.join("commondir"), "../..\n").expect("test");

        let mut roots = GitRoots::new();
        // Repo semantics: the shared repository's working directory.
        assert_eq!(roots.repo_root(&wt), Some(main));
        // Checkout semantics: the worktree itself.
        assert_eq!(roots.checkout_root(&wt), Some(wt));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn results_are_cached_until_flush() {
        let tmp = unique_temp_dir("git-cache");
        let repo = tmp.join("repo");
        fs::create_dir_all(repo.join(".git")).expect("test");

        let mut roots = GitRoots::new();
        assert_eq!(roots.repo_root(&repo), Some(repo.clone()));

        // Remove .git on disk; the cached answer survives until flush.
        fs::remove_dir_all(repo.join(".git")).expect("test");
        assert_eq!(roots.repo_root(&repo), Some(repo.clone()));

        roots.flush();
        assert_eq!(roots.repo_root(&repo), None);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn lexical_normalize_resolves_dotdot() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/.git/worktrees/wt/../..")),
            PathBuf::from("/a/b/.git")
        );
        assert_eq!(
            lexical_normalize(Path::new("/a/./b")),
            PathBuf::from("/a/b")
        );
    }
}
