//! core::paths
//!
//! Path normalization for repository-relative paths.
//!
//! # Invariants
//!
//! Every path handed to the remote or used as a cache key goes through
//! [`normalize_path`] first. Two strings that differ only by surrounding
//! slashes resolve to the same entry and the same cache slot.
//!
//! # Example
//!
//! ```
//! use hubtree::core::paths::normalize_path;
//!
//! assert_eq!(normalize_path("/src/lib.rs/"), "src/lib.rs");
//! assert_eq!(normalize_path("/"), "");
//! ```

/// Strip leading and trailing `/` from a repository path.
///
/// The empty string denotes the repository root.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Final path segment, or the whole path when it has no `/`.
pub fn basename(path: &str) -> &str {
    let path = normalize_path(path);
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// The prefix used to match descendants of `dir`.
///
/// Empty for the root, otherwise `dir + "/"`.
pub fn child_prefix(dir: &str) -> String {
    let dir = normalize_path(dir);
    if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    }
}

/// File extension of the final segment, without the dot.
///
/// Dotfiles such as `.gitignore` have no extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 < name.len() => Some(&name[idx + 1..]),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_surrounding_slashes() {
        assert_eq!(normalize_path("foo"), "foo");
        assert_eq!(normalize_path("/foo"), "foo");
        assert_eq!(normalize_path("foo/"), "foo");
        assert_eq!(normalize_path("//foo/bar//"), "foo/bar");
    }

    #[test]
    fn normalize_root() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path("///"), "");
    }

    #[test]
    fn basename_of_nested_path() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(basename("/a/b/"), "b");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn child_prefix_adds_separator() {
        assert_eq!(child_prefix(""), "");
        assert_eq!(child_prefix("/"), "");
        assert_eq!(child_prefix("a"), "a/");
        assert_eq!(child_prefix("/a/b/"), "a/b/");
    }

    #[test]
    fn extension_of_final_segment() {
        assert_eq!(extension("docs/readme.md"), Some("md"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension("Makefile"), None);
        assert_eq!(extension(".gitignore"), None);
        assert_eq!(extension("v1.2/LICENSE"), None);
        assert_eq!(extension("trailing."), None);
    }
}
