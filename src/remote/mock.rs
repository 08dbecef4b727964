//! remote::mock
//!
//! Mock gateway implementation for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a flat tree, file contents, and per-path commit
//! histories in memory. It answers `show_path` with the same shape rules
//! as the real contents API (directories are a bare hint, files carry
//! fields), records every call for verification, and can be configured
//! to fail a given operation or to delay responses so concurrent callers
//! overlap.
//!
//! # Example
//!
//! ```
//! use hubtree::remote::mock::MockRemote;
//! use hubtree::remote::{RemoteRepository, ShowPathResult};
//!
//! # tokio_test::block_on(async {
//! let remote = MockRemote::new()
//!     .with_file("docs/readme.md", b"# hello")
//!     .with_commits("docs/readme.md", &["2020-01-02T00:00:00Z", "2020-01-01T00:00:00Z"]);
//!
//! assert_eq!(remote.show_path("docs").await.unwrap(), ShowPathResult::DirectoryHint);
//! assert_eq!(remote.download("docs/readme.md").await.unwrap(), b"# hello");
//! assert_eq!(remote.commits_for_path("docs/readme.md").await.unwrap().len(), 2);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::{
    CommitHistory, CommitRecord, RawEntry, RemoteError, RemoteRepository, ShowPathResult,
    TreeListing,
};
use crate::core::paths::{basename, child_prefix};

/// Mock gateway for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state,
/// so a test can keep a handle for verification after handing a clone to
/// the code under test.
#[derive(Debug, Clone)]
pub struct MockRemote {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockRemoteInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockRemoteInner {
    /// Flat tree in insertion order.
    tree: Vec<RawEntry>,
    /// Whether listings report truncation.
    truncated: bool,
    /// File contents by path.
    contents: HashMap<String, Vec<u8>>,
    /// Commit histories by path, newest first.
    commits: HashMap<String, Vec<CommitRecord>>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Artificial latency applied before every response.
    latency: Option<Duration>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
    /// Calls currently inside their latency window.
    in_flight: usize,
    /// Highest `in_flight` seen.
    max_in_flight: usize,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Exists(RemoteError),
    Download(RemoteError),
    ShowPath(RemoteError),
    ListTree(RemoteError),
    CommitsForPath(RemoteError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Exists { path: String },
    Download { path: String },
    ShowPath { path: String },
    ListTree,
    CommitsForPath { path: String },
}

impl MockRemote {
    /// Create a new empty mock repository.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRemoteInner::default())),
        }
    }

    /// Add a raw tree entry as-is.
    pub fn with_entry(self, entry: RawEntry) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.tree.push(entry);
        }
        self
    }

    /// Add a directory, creating missing parent directories.
    pub fn with_dir(self, path: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.ensure_dirs(path, true);
        }
        self
    }

    /// Add a file with contents, creating missing parent directories.
    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.ensure_dirs(path, false);
            let mut entry = RawEntry::blob(path);
            entry.size = u64::try_from(contents.len()).ok();
            entry.sha = Some(format!("sha-{}", path));
            inner.tree.push(entry);
            inner.contents.insert(path.to_string(), contents.to_vec());
        }
        self
    }

    /// Set the commit history of a path from committer dates, newest first.
    pub fn with_commits(self, path: &str, dates: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let records = dates
                .iter()
                .enumerate()
                .map(|(i, date)| CommitRecord {
                    sha: format!("{}@{}", path, i),
                    committer_date: date.to_string(),
                })
                .collect();
            inner.commits.insert(path.to_string(), records);
        }
        self
    }

    /// Make tree listings report truncation.
    pub fn truncated(self, truncated: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.truncated = truncated;
        }
        self
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_latency(self, latency: Duration) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.latency = Some(latency);
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use hubtree::remote::mock::{FailOn, MockRemote};
    /// use hubtree::remote::RemoteError;
    ///
    /// let remote = MockRemote::new().fail_on(FailOn::ListTree(RemoteError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Count recorded operations equal to `op`.
    pub fn count(&self, op: &MockOperation) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|o| *o == op).count()
    }

    /// Number of `show_path` calls for a path.
    pub fn show_path_calls(&self, path: &str) -> usize {
        self.count(&MockOperation::ShowPath {
            path: path.to_string(),
        })
    }

    /// Number of `commits_for_path` calls for a path.
    pub fn commit_calls(&self, path: &str) -> usize {
        self.count(&MockOperation::CommitsForPath {
            path: path.to_string(),
        })
    }

    /// Number of tree listings fetched.
    pub fn list_tree_calls(&self) -> usize {
        self.count(&MockOperation::ListTree)
    }

    /// Most calls that were ever in progress at the same time.
    ///
    /// Only meaningful with [`MockRemote::with_latency`], which keeps calls
    /// open long enough to overlap.
    pub fn max_in_flight(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.max_in_flight
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Record an operation, mark it in flight, and return the latency.
    fn record(&self, op: MockOperation) -> Option<Duration> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
        inner.in_flight += 1;
        inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
        inner.latency
    }

    fn finish(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
    }

    /// Record, wait out the latency, then check for a configured failure.
    async fn enter(&self, op: MockOperation) -> Result<(), RemoteError> {
        let kind = op.clone();
        if let Some(latency) = self.record(op) {
            tokio::time::sleep(latency).await;
        }
        self.finish();
        match self.check_fail(&kind) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, op: &MockOperation) -> Option<RemoteError> {
        let inner = self.inner.lock().unwrap();
        match (&inner.fail_on, op) {
            (Some(FailOn::Exists(e)), MockOperation::Exists { .. }) => Some(e.clone()),
            (Some(FailOn::Download(e)), MockOperation::Download { .. }) => Some(e.clone()),
            (Some(FailOn::ShowPath(e)), MockOperation::ShowPath { .. }) => Some(e.clone()),
            (Some(FailOn::ListTree(e)), MockOperation::ListTree) => Some(e.clone()),
            (Some(FailOn::CommitsForPath(e)), MockOperation::CommitsForPath { .. }) => {
                Some(e.clone())
            }
            _ => None,
        }
    }

    /// Resolve a single path the way the contents API does.
    fn lookup(&self, path: &str) -> Option<ShowPathResult> {
        let inner = self.inner.lock().unwrap();
        if path.is_empty() {
            return Some(ShowPathResult::DirectoryHint);
        }

        let prefix = child_prefix(path);
        for entry in &inner.tree {
            if entry.path() == path {
                return Some(if entry.is_blob() {
                    ShowPathResult::File(RawEntry {
                        path: entry.path.clone(),
                        name: Some(basename(path).to_string()),
                        basename: None,
                        raw_type: Some("file".to_string()),
                        mode: None,
                        size: entry.size,
                        sha: entry.sha.clone(),
                    })
                } else {
                    ShowPathResult::DirectoryHint
                });
            }
            if entry.path().starts_with(&prefix) {
                return Some(ShowPathResult::DirectoryHint);
            }
        }
        None
    }
}

impl MockRemoteInner {
    /// Push tree entries for every missing ancestor of `path`.
    fn ensure_dirs(&mut self, path: &str, include_self: bool) {
        let segments: Vec<&str> = path.split('/').collect();
        let depth = if include_self {
            segments.len()
        } else {
            segments.len().saturating_sub(1)
        };

        for i in 1..=depth {
            let dir = segments[..i].join("/");
            if !self.tree.iter().any(|e| e.path() == dir) {
                self.tree.push(RawEntry::tree(dir));
            }
        }
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteRepository for MockRemote {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        self.enter(MockOperation::Exists {
            path: path.to_string(),
        })
        .await?;

        Ok(self.lookup(path).is_some())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        self.enter(MockOperation::Download {
            path: path.to_string(),
        })
        .await?;

        let inner = self.inner.lock().unwrap();
        inner
            .contents
            .get(path)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    async fn show_path(&self, path: &str) -> Result<ShowPathResult, RemoteError> {
        self.enter(MockOperation::ShowPath {
            path: path.to_string(),
        })
        .await?;

        self.lookup(path)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    async fn list_tree_recursive(&self) -> Result<TreeListing, RemoteError> {
        self.enter(MockOperation::ListTree).await?;

        let inner = self.inner.lock().unwrap();
        Ok(TreeListing {
            entries: inner.tree.clone(),
            truncated: inner.truncated,
        })
    }

    async fn commits_for_path(&self, path: &str) -> Result<CommitHistory, RemoteError> {
        self.enter(MockOperation::CommitsForPath {
            path: path.to_string(),
        })
        .await?;

        let inner = self.inner.lock().unwrap();
        Ok(CommitHistory::new(
            inner.commits.get(path).cloned().unwrap_or_default(),
        ))
    }
}
