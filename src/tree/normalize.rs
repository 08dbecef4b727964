//! tree::normalize
//!
//! Turns raw remote entries into uniform [`TreeEntry`] values.
//!
//! # Rules
//!
//! - `name`: explicit name, then `basename`, then path, else `None`
//! - `kind`: `blob` is a file, `tree` a directory, anything else the
//!   explicit [`EntryKind::Unknown`] sentinel
//! - `visibility`: from the permission bits of `mode`, public by default
//! - `timestamp`: left empty; the aggregator fills it in
//!
//! A single entry and a whole listing go through the same path:
//! [`normalize_entries`] takes any iterator, so one entry is just
//! `std::iter::once(&raw)`.

use crate::core::paths::normalize_path;
use crate::core::types::{EntryKind, TreeEntry, Visibility};
use crate::remote::RawEntry;

/// Group-read and other-read permission bits.
const READ_BITS: u32 = 0o044;

/// All permission bits.
const PERMISSION_BITS: u32 = 0o777;

/// Normalize every entry of a listing, preserving order.
pub fn normalize_entries<'a, I>(entries: I) -> Vec<TreeEntry>
where
    I: IntoIterator<Item = &'a RawEntry>,
{
    entries.into_iter().map(normalize_entry).collect()
}

/// Normalize one raw entry.
pub fn normalize_entry(raw: &RawEntry) -> TreeEntry {
    let path = normalize_path(raw.path()).to_string();

    let name = raw
        .name
        .clone()
        .or_else(|| raw.basename.clone())
        .or_else(|| raw.path.as_ref().map(|_| path.clone()));

    let visibility = raw
        .mode
        .as_deref()
        .map(visibility_from_mode)
        .unwrap_or_default();

    TreeEntry {
        path,
        name,
        kind: EntryKind::from_raw(raw.raw_type.as_deref()),
        visibility,
        mode: raw.mode.clone(),
        size: raw.size,
        sha: raw.sha.clone(),
        timestamp: None,
    }
}

/// Derive visibility from a git mode string such as `100644`.
///
/// Modes without permission bits (`040000` trees, `120000` symlinks,
/// `160000` submodules) and unparseable modes are public.
pub fn visibility_from_mode(mode: &str) -> Visibility {
    let bits = match u32::from_str_radix(mode.trim(), 8) {
        Ok(bits) => bits,
        Err(_) => {
            tracing::warn!(mode, "unparseable mode, assuming public");
            return Visibility::Public;
        }
    };

    if bits & PERMISSION_BITS == 0 || bits & READ_BITS != 0 {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod name {
        use super::*;

        #[test]
        fn explicit_name_wins() {
            let raw = RawEntry {
                path: Some("a/b.txt".into()),
                name: Some("b.txt".into()),
                basename: Some("ignored".into()),
                ..RawEntry::default()
            };
            assert_eq!(normalize_entry(&raw).name.as_deref(), Some("b.txt"));
        }

        #[test]
        fn basename_before_path() {
            let raw = RawEntry {
                path: Some("a/b.txt".into()),
                basename: Some("b.txt".into()),
                ..RawEntry::default()
            };
            assert_eq!(normalize_entry(&raw).name.as_deref(), Some("b.txt"));
        }

        #[test]
        fn falls_back_to_path() {
            let entry = normalize_entry(&RawEntry::blob("a/b.txt"));
            assert_eq!(entry.name.as_deref(), Some("a/b.txt"));
        }

        #[test]
        fn none_without_any_source() {
            let entry = normalize_entry(&RawEntry::default());
            assert!(entry.name.is_none());
            assert_eq!(entry.path, "");
        }
    }

    mod kind {
        use super::*;

        #[test]
        fn blob_and_tree() {
            assert_eq!(normalize_entry(&RawEntry::blob("f")).kind, EntryKind::File);
            assert_eq!(
                normalize_entry(&RawEntry::tree("d")).kind,
                EntryKind::Directory
            );
        }

        #[test]
        fn submodule_is_unknown() {
            let raw = RawEntry::tree_item("vendor/lib", "commit", "160000");
            assert_eq!(
                normalize_entry(&raw).kind,
                EntryKind::Unknown(Some("commit".into()))
            );
        }

        #[test]
        fn missing_type_is_unknown() {
            let raw = RawEntry {
                path: Some("x".into()),
                ..RawEntry::default()
            };
            assert_eq!(normalize_entry(&raw).kind, EntryKind::Unknown(None));
        }
    }

    mod visibility {
        use super::*;

        #[test]
        fn readable_file_is_public() {
            assert_eq!(visibility_from_mode("100644"), Visibility::Public);
            assert_eq!(visibility_from_mode("100755"), Visibility::Public);
            assert_eq!(visibility_from_mode("100640"), Visibility::Public);
        }

        #[test]
        fn owner_only_is_private() {
            assert_eq!(visibility_from_mode("100600"), Visibility::Private);
            assert_eq!(visibility_from_mode("100700"), Visibility::Private);
        }

        #[test]
        fn modes_without_permission_bits_are_public() {
            assert_eq!(visibility_from_mode("040000"), Visibility::Public);
            assert_eq!(visibility_from_mode("160000"), Visibility::Public);
        }

        #[test]
        fn garbage_is_public() {
            assert_eq!(visibility_from_mode("rw-r--r--"), Visibility::Public);
            assert_eq!(visibility_from_mode(""), Visibility::Public);
        }

        #[test]
        fn missing_mode_is_public() {
            let raw = RawEntry {
                path: Some("x".into()),
                raw_type: Some("blob".into()),
                ..RawEntry::default()
            };
            assert_eq!(normalize_entry(&raw).visibility, Visibility::Public);
        }
    }

    #[test]
    fn root_paths_do_not_panic() {
        for path in ["", "/"] {
            let raw = RawEntry::tree(path);
            let entry = normalize_entry(&raw);
            assert_eq!(entry.path, "");
            assert_eq!(entry.kind, EntryKind::Directory);
        }
    }

    #[test]
    fn placeholders_are_empty() {
        let mut raw = RawEntry::blob("/src/lib.rs/");
        raw.size = Some(5);
        raw.sha = Some("abc".into());
        let entry = normalize_entry(&raw);
        assert_eq!(entry.path, "src/lib.rs");
        assert_eq!(entry.size, Some(5));
        assert_eq!(entry.sha.as_deref(), Some("abc"));
        assert!(entry.timestamp.is_none());
    }

    #[test]
    fn single_and_many_share_one_path() {
        let raw = RawEntry::blob("a");
        let one = normalize_entries(std::iter::once(&raw));
        let many = normalize_entries(&[raw.clone(), RawEntry::tree("b")]);
        assert_eq!(one.len(), 1);
        assert_eq!(many.len(), 2);
        assert_eq!(one[0], many[0]);
    }
}
