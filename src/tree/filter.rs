//! tree::filter
//!
//! Selects the part of a flat recursive listing that lies under a path.
//!
//! # Matching
//!
//! Matching is segment-aware: an entry is under `dir` when its path starts
//! with `dir + "/"`, so `a` never matches `ab/c`. The directory itself is
//! not part of its own contents. When the target path names a file, that
//! file alone is returned.
//!
//! | target | recursive | selected |
//! |---|---|---|
//! | `""` | yes | everything |
//! | `""` | no | top-level entries (no `/` in the path) |
//! | `dir` | yes | every descendant of `dir` |
//! | `dir` | no | direct children of `dir` |
//!
//! Order of the input is preserved.

use crate::core::paths::{child_prefix, normalize_path};
use crate::core::types::TreeEntry;
use crate::remote::RawEntry;

/// Anything with a repository path that can be filtered.
pub trait TreePath {
    /// Repository path, as stored.
    fn tree_path(&self) -> &str;

    /// Whether the entry is a file (a leaf that can be named directly).
    fn is_leaf(&self) -> bool;
}

impl TreePath for RawEntry {
    fn tree_path(&self) -> &str {
        self.path()
    }

    fn is_leaf(&self) -> bool {
        self.is_blob()
    }
}

impl TreePath for TreeEntry {
    fn tree_path(&self) -> &str {
        &self.path
    }

    fn is_leaf(&self) -> bool {
        self.kind.is_file()
    }
}

/// Entries under `path`, direct children only unless `recursive`.
pub fn filter_tree<'a, T: TreePath>(entries: &'a [T], path: &str, recursive: bool) -> Vec<&'a T> {
    let target = normalize_path(path);
    let prefix = child_prefix(target);

    entries
        .iter()
        .filter(|entry| {
            let path = normalize_path(entry.tree_path());
            is_under(path, target, &prefix, recursive, entry.is_leaf())
        })
        .collect()
}

fn is_under(entry_path: &str, target: &str, prefix: &str, recursive: bool, leaf: bool) -> bool {
    if !target.is_empty() && entry_path == target {
        return leaf;
    }

    match entry_path.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => recursive || !rest.contains('/'),
        _ => false,
    }
}
