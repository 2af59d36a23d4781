//! Filesystem probe for readiness checks
//!
//! Answers three questions about a repository tree, each memoized for the
//! lifetime of one probe:
//! - does any of these paths or globs exist?
//! - what is the text of this file?
//! - does any of the first few files matching a glob contain a pattern?
//!
//! The tree is assumed static for the duration of a run, so caches are never
//! invalidated. Every I/O failure reads as "absent"; nothing here returns an
//! error.

pub mod shell;
mod tree;

pub use shell::{CommandOutput, CommandRunner, SystemRunner};

use dashmap::DashMap;
use regex::RegexBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;
use tree::TreeIndex;

/// Content scans read at most this many files per glob. Keeps regex searches
/// bounded on large monorepos where a `**/*.py` glob can match thousands of files.
pub const GLOB_SCAN_LIMIT: usize = 10;

/// Only the first workflow files (sorted by name) are scanned for CI patterns.
pub const WORKFLOW_SCAN_LIMIT: usize = 5;

/// CI workflow files, both extensions
pub const WORKFLOW_GLOB: &str = ".github/workflows/*.{yml,yaml}";

/// Cached, read-only view of one repository tree
pub struct RepoProbe {
    root: PathBuf,
    tree: OnceLock<TreeIndex>,
    /// pattern -> exists
    exists: DashMap<String, bool>,
    /// relative path -> content (None cached for misses)
    contents: DashMap<String, Option<Arc<str>>>,
    /// (glob, regex) -> any match
    searches: DashMap<(String, Option<String>), bool>,
    workflows: OnceLock<Vec<Arc<str>>>,
}

impl RepoProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tree: OnceLock::new(),
            exists: DashMap::new(),
            contents: DashMap::new(),
            searches: DashMap::new(),
            workflows: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tree(&self) -> &TreeIndex {
        self.tree.get_or_init(|| TreeIndex::build(&self.root))
    }

    /// True if any pattern matches. Literal paths are checked directly,
    /// glob patterns against the tree index.
    pub fn exists(&self, patterns: &[&str]) -> bool {
        self.exists_in("", patterns)
    }

    /// Like [`exists`](Self::exists), with patterns relative to `dir`
    /// (a repo-relative directory, "" for the root).
    pub fn exists_in(&self, dir: &str, patterns: &[&str]) -> bool {
        patterns.iter().any(|pattern| {
            let key = join_relative(dir, pattern);
            if let Some(hit) = self.exists.get(&key) {
                return *hit;
            }
            let hit = if is_glob(pattern) {
                let glob = join_glob(dir, pattern);
                self.tree().any_match(&glob)
            } else {
                self.root.join(&key).exists()
            };
            self.exists.insert(key, hit);
            hit
        })
    }

    /// Text content of a repo-relative file, lossily decoded
    pub fn read(&self, path: &str) -> Option<Arc<str>> {
        if let Some(cached) = self.contents.get(path) {
            return cached.value().clone();
        }
        let content = std::fs::read(self.root.join(path))
            .ok()
            .map(|bytes| Arc::<str>::from(String::from_utf8_lossy(&bytes).as_ref()));
        self.contents.insert(path.to_string(), content.clone());
        content
    }

    /// Lowercased content, or an empty string when the file is missing
    pub fn read_lower(&self, path: &str) -> String {
        self.read(path)
            .map(|c| c.to_lowercase())
            .unwrap_or_default()
    }

    /// Content of `path` inside a repo-relative directory
    pub fn read_in(&self, dir: &str, path: &str) -> Option<Arc<str>> {
        self.read(&join_relative(dir, path))
    }

    /// Lowercased content of `path` inside a repo-relative directory
    pub fn read_lower_in(&self, dir: &str, path: &str) -> String {
        self.read_lower(&join_relative(dir, path))
    }

    /// First existing file among `paths`, lowercased
    pub fn read_first_lower(&self, paths: &[&str]) -> String {
        paths
            .iter()
            .find_map(|p| self.read(p))
            .map(|c| c.to_lowercase())
            .unwrap_or_default()
    }

    /// Concatenated lowercased contents of every existing file in `paths`
    pub fn read_all_lower(&self, paths: &[&str]) -> String {
        self.read_all_lower_in("", paths)
    }

    pub fn read_all_lower_in(&self, dir: &str, paths: &[&str]) -> String {
        paths
            .iter()
            .filter_map(|p| self.read_in(dir, p))
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True if any of the first [`GLOB_SCAN_LIMIT`] files matching `glob`
    /// contains `pattern` (case-insensitive). Without a pattern, any match counts.
    pub fn search(&self, glob: &str, pattern: Option<&str>) -> bool {
        let key = (glob.to_string(), pattern.map(str::to_string));
        if let Some(hit) = self.searches.get(&key) {
            return *hit;
        }
        let hit = self.search_uncached(glob, pattern);
        self.searches.insert(key, hit);
        hit
    }

    /// [`search`](Self::search) scoped to a repo-relative directory
    pub fn search_in(&self, dir: &str, glob: &str, pattern: Option<&str>) -> bool {
        self.search(&join_glob(dir, glob), pattern)
    }

    fn search_uncached(&self, glob: &str, pattern: Option<&str>) -> bool {
        let files = self.tree().matching_files(glob, GLOB_SCAN_LIMIT);
        if files.is_empty() {
            return false;
        }
        let Some(pattern) = pattern else {
            return true;
        };
        let regex = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(r) => r,
            Err(e) => {
                debug!("Invalid search pattern {:?}: {}", pattern, e);
                return false;
            }
        };
        files
            .iter()
            .filter_map(|rel| self.read(rel))
            .any(|content| regex.is_match(&content))
    }

    /// Contents of the first [`WORKFLOW_SCAN_LIMIT`] CI workflow files
    pub fn workflows(&self) -> &[Arc<str>] {
        self.workflows.get_or_init(|| {
            self.tree()
                .matching_files(WORKFLOW_GLOB, WORKFLOW_SCAN_LIMIT)
                .iter()
                .filter_map(|rel| self.read(rel))
                .collect()
        })
    }

    /// True if any scanned workflow mentions one of `needles` (case-insensitive)
    pub fn workflows_mention(&self, needles: &[&str]) -> bool {
        self.workflows().iter().any(|wf| {
            let lower = wf.to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
    }

    /// Repo-relative paths of up to `limit` files matching `glob`
    pub fn glob_files(&self, glob: &str, limit: usize) -> Vec<String> {
        self.tree().matching_files(glob, limit)
    }

    /// Immediate children of a repo-relative directory as (name, is_dir),
    /// sorted by name. Empty when the directory is missing.
    pub fn list_dir(&self, dir: &str) -> Vec<(String, bool)> {
        let Ok(entries) = std::fs::read_dir(self.root.join(dir)) else {
            return Vec::new();
        };
        let mut children: Vec<(String, bool)> = entries
            .filter_map(|e| e.ok())
            .map(|e| {
                let is_dir = e.path().is_dir();
                (e.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .collect();
        children.sort();
        children
    }

    pub fn is_dir(&self, dir: &str) -> bool {
        self.root.join(dir).is_dir()
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn join_relative(dir: &str, pattern: &str) -> String {
    if dir.is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), pattern)
    }
}

/// Directory names are escaped so that brackets in a folder name stay literal
fn join_glob(dir: &str, pattern: &str) -> String {
    if dir.is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", globset::escape(dir.trim_end_matches('/')), pattern)
    }
}
