//! In-memory index of a repository tree for glob matching

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::path::Path;
use tracing::debug;

/// One walked entry, path relative to the root with `/` separators
struct Entry {
    path: String,
    is_dir: bool,
}

/// Sorted list of every file and directory under a root.
///
/// Hidden files are included, `.git` is skipped and `.gitignore` rules apply,
/// so vendored dependency trees do not dominate glob matches.
pub(super) struct TreeIndex {
    entries: Vec<Entry>,
}

impl TreeIndex {
    pub(super) fn build(root: &Path) -> Self {
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .parents(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .filter_entry(|e| e.file_name() != ".git")
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let entries: Vec<Entry> = walker
            .filter_map(|e| e.ok())
            .filter(|e| e.depth() > 0)
            .filter_map(|e| {
                let rel = e.path().strip_prefix(root).ok()?;
                let path = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some(Entry { path, is_dir })
            })
            .collect();

        debug!("Indexed {} entries under {}", entries.len(), root.display());
        Self { entries }
    }

    /// True if any entry (file or directory) matches
    pub(super) fn any_match(&self, pattern: &str) -> bool {
        let Some(query) = GlobQuery::new(pattern) else {
            return false;
        };
        self.entries.iter().any(|e| query.matches(e))
    }

    /// Up to `limit` matching files, in walk order
    pub(super) fn matching_files(&self, pattern: &str, limit: usize) -> Vec<String> {
        let Some(query) = GlobQuery::new(pattern) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| !e.is_dir && query.matches(e))
            .take(limit)
            .map(|e| e.path.clone())
            .collect()
    }
}

/// Compiled glob. A trailing `/**` also matches the directory itself,
/// so `e2e/**` holds for an existing but empty `e2e/` folder.
pub(super) struct GlobQuery {
    matcher: GlobMatcher,
    dir_matcher: Option<GlobMatcher>,
}

impl GlobQuery {
    pub(super) fn new(pattern: &str) -> Option<Self> {
        let matcher = compile(pattern)?;
        let dir_matcher = pattern
            .strip_suffix("/**")
            .filter(|base| !base.is_empty())
            .and_then(compile);
        Some(Self {
            matcher,
            dir_matcher,
        })
    }

    fn matches(&self, entry: &Entry) -> bool {
        if self.matcher.is_match(&entry.path) {
            return true;
        }
        entry.is_dir
            && self
                .dir_matcher
                .as_ref()
                .is_some_and(|m| m.is_match(&entry.path))
    }
}

fn compile(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            debug!("Invalid glob {:?}: {}", pattern, e);
            None
        }
    }
}
