//! tree::timestamp
//!
//! Directory timestamp synthesis.
//!
//! The remote has no notion of a directory modification time. A
//! directory's timestamp is the maximum file timestamp over every file
//! that lies under it, at any depth. Subdirectories never contribute on
//! their own, only through their files. With no file descendants the
//! result is `0`.
//!
//! The per-file lookup is supplied by the caller so it can route through
//! the commit-history cache. At most `limit` lookups run at once; repeated
//! paths collapse into one fetch at the cache.

use std::future::Future;

use chrono::DateTime;
use futures::stream::{self, StreamExt, TryStreamExt};

use super::error::TreeError;
use super::filter::filter_tree;
use crate::core::types::TreeEntry;
use crate::remote::CommitRecord;

/// Timestamp used for a directory with no files under it.
pub const EMPTY_DIRECTORY_TIMESTAMP: i64 = 0;

/// Aggregate the timestamp of `dir` over the file entries of `entries`.
///
/// `entries` is a flat listing, usually the whole tree. Any error from
/// `file_timestamp` aborts the aggregation and is returned as-is. A
/// `limit` of zero is treated as one.
pub async fn directory_timestamp<F, Fut>(
    entries: &[TreeEntry],
    dir: &str,
    limit: usize,
    file_timestamp: F,
) -> Result<i64, TreeError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<i64, TreeError>>,
{
    let lookups = filter_tree(entries, dir, true)
        .into_iter()
        .filter(|entry| entry.kind.is_file())
        .map(|entry| file_timestamp(entry.path.clone()));

    let timestamps: Vec<i64> = stream::iter(lookups)
        .buffer_unordered(limit.max(1))
        .try_collect()
        .await?;
    tracing::debug!(dir, files = timestamps.len(), "aggregated directory timestamp");

    Ok(timestamps
        .into_iter()
        .max()
        .unwrap_or(EMPTY_DIRECTORY_TIMESTAMP))
}

/// Parse a commit's RFC 3339 committer date into Unix seconds.
pub fn commit_timestamp(path: &str, commit: &CommitRecord) -> Result<i64, TreeError> {
    DateTime::parse_from_rfc3339(&commit.committer_date)
        .map(|date| date.timestamp())
        .map_err(|_| TreeError::InvalidTimestamp {
            path: path.to_string(),
            value: commit.committer_date.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RawEntry;
    use crate::tree::normalize::normalize_entries;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn entries() -> Vec<TreeEntry> {
        normalize_entries(&[
            RawEntry::tree("d"),
            RawEntry::blob("d/f1"),
            RawEntry::tree("d/sub"),
            RawEntry::blob("d/sub/f2"),
            RawEntry::tree("empty"),
            RawEntry::blob("other"),
        ])
    }

    fn created() -> HashMap<&'static str, i64> {
        HashMap::from([("d/f1", 100), ("d/sub/f2", 200), ("other", 999)])
    }

    #[tokio::test]
    async fn max_over_nested_files() {
        let times = created();
        let ts = directory_timestamp(&entries(), "d", 4, |path| {
            let ts = times[path.as_str()];
            async move { Ok(ts) }
        })
        .await
        .unwrap();
        assert_eq!(ts, 200);
    }

    #[tokio::test]
    async fn only_files_are_looked_up() {
        let seen = Mutex::new(Vec::new());
        let times = created();
        directory_timestamp(&entries(), "d", 4, |path| {
            let ts = times[path.as_str()];
            seen.lock().unwrap().push(path);
            async move { Ok(ts) }
        })
        .await
        .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, vec!["d/f1", "d/sub/f2"]);
    }

    #[tokio::test]
    async fn empty_directory_is_zero() {
        let ts = directory_timestamp(&entries(), "empty", 4, |_| async { Ok(5) })
            .await
            .unwrap();
        assert_eq!(ts, EMPTY_DIRECTORY_TIMESTAMP);
    }

    #[tokio::test]
    async fn root_covers_everything() {
        let times = created();
        let ts = directory_timestamp(&entries(), "", 4, |path| {
            let ts = times[path.as_str()];
            async move { Ok(ts) }
        })
        .await
        .unwrap();
        assert_eq!(ts, 999);
    }

    #[tokio::test]
    async fn lookups_are_bounded() {
        let entries = normalize_entries(
            &(0..20)
                .map(|i| RawEntry::blob(format!("many/f{}", i)))
                .collect::<Vec<_>>(),
        );
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let ts = directory_timestamp(&entries, "many", 3, |path| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(path.len() as i64)
            }
        })
        .await
        .unwrap();

        assert_eq!(ts, "many/f10".len() as i64);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn lookup_error_propagates() {
        let err = directory_timestamp(&entries(), "d", 4, |path| async move {
            Err(TreeError::NoCommitHistory(path))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, TreeError::NoCommitHistory(_)));
    }

    #[test]
    fn parses_committer_dates() {
        let commit = CommitRecord {
            sha: "a".into(),
            committer_date: "1970-01-01T00:03:20Z".into(),
        };
        assert_eq!(commit_timestamp("f", &commit).unwrap(), 200);

        let offset = CommitRecord {
            sha: "b".into(),
            committer_date: "2020-01-01T02:00:00+02:00".into(),
        };
        assert_eq!(commit_timestamp("f", &offset).unwrap(), 1_577_836_800);
    }

    #[test]
    fn bad_date_is_an_error() {
        let commit = CommitRecord {
            sha: "a".into(),
            committer_date: "yesterday".into(),
        };
        assert_eq!(
            commit_timestamp("f", &commit).unwrap_err(),
            TreeError::InvalidTimestamp {
                path: "f".into(),
                value: "yesterday".into()
            }
        );
    }
}
