//! remote::traits
//!
//! Gateway trait for reading a hosted repository over its REST API.
//!
//! # Design
//!
//! The `RemoteRepository` trait is async because every operation is
//! network I/O. Implementations carry no business logic: they fetch,
//! decode into the wire-level types below, and map failures onto
//! [`RemoteError`]. Retry policy, if any, also lives here and never in
//! the tree layer.
//!
//! # Directory detection
//!
//! The contents API answers a single-path lookup with an object for a
//! file and an array for a directory. Implementations fold that shape
//! difference into [`ShowPathResult`] so no caller ever inspects raw JSON.
//!
//! # Example
//!
//! ```ignore
//! use hubtree::remote::{RemoteRepository, ShowPathResult};
//!
//! async fn describe(remote: &dyn RemoteRepository) -> Result<(), RemoteError> {
//!     match remote.show_path("src").await? {
//!         ShowPathResult::File(entry) => println!("file {:?}", entry.path),
//!         ShowPathResult::DirectoryHint => println!("directory"),
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from remote repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested path or reference was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A request URL could not be built from the API base and path.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

/// One raw entry as returned by the tree or contents API.
///
/// Every field is optional: tree listings carry `path`/`mode`/`type`/`sha`
/// (and `size` for blobs), contents lookups carry `name` and a `file`/`dir`
/// type instead. The normalizer turns this into a [`crate::core::types::TreeEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub basename: Option<String>,
    #[serde(default, rename = "type")]
    pub raw_type: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub sha: Option<String>,
}

impl RawEntry {
    /// A tree-listing style entry.
    pub fn tree_item(path: impl Into<String>, raw_type: &str, mode: &str) -> Self {
        Self {
            path: Some(path.into()),
            raw_type: Some(raw_type.to_string()),
            mode: Some(mode.to_string()),
            ..Self::default()
        }
    }

    /// A blob entry with the regular-file mode.
    pub fn blob(path: impl Into<String>) -> Self {
        Self::tree_item(path, "blob", "100644")
    }

    /// A subtree entry.
    pub fn tree(path: impl Into<String>) -> Self {
        Self::tree_item(path, "tree", "040000")
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    pub fn is_blob(&self) -> bool {
        matches!(self.raw_type.as_deref(), Some("blob") | Some("file"))
    }
}

/// Result of a single-path lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowPathResult {
    /// The path is a file; carries its raw fields.
    File(RawEntry),
    /// The path is a directory. The remote gives no usable fields for it.
    DirectoryHint,
}

/// Full recursive listing of the tree at the configured reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TreeListing {
    #[serde(rename = "tree", default)]
    pub entries: Vec<RawEntry>,
    /// The server capped the listing. Not paginated further.
    #[serde(default)]
    pub truncated: bool,
}

/// One commit touching a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    /// RFC 3339 committer date, as sent by the remote.
    pub committer_date: String,
}

/// Commits for one path, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitHistory(pub Vec<CommitRecord>);

impl CommitHistory {
    pub fn new(commits: Vec<CommitRecord>) -> Self {
        Self(commits)
    }

    /// The most recent commit (last updated).
    pub fn newest(&self) -> Option<&CommitRecord> {
        self.0.first()
    }

    /// The oldest commit (created).
    pub fn oldest(&self) -> Option<&CommitRecord> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Read-only access to a hosted repository.
///
/// All paths passed in are already normalized (no surrounding `/`).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the tree layer may issue
/// several requests concurrently.
///
/// # Error Handling
///
/// - `NotFound`: the path does not exist at the reference. The tree layer
///   turns this into a regular "no entry" result where appropriate.
/// - Everything else is propagated to the caller unchanged.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Get the gateway name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Check whether a path exists at the reference.
    async fn exists(&self, path: &str) -> Result<bool, RemoteError>;

    /// Download the raw contents of a file.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file doesn't exist
    async fn download(&self, path: &str) -> Result<Vec<u8>, RemoteError>;

    /// Describe a single path.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path doesn't exist
    async fn show_path(&self, path: &str) -> Result<ShowPathResult, RemoteError>;

    /// List the whole tree at the reference.
    ///
    /// Always recursive: the remote returns a flat list either way and a
    /// shallow view is derived client-side.
    async fn list_tree_recursive(&self) -> Result<TreeListing, RemoteError>;

    /// List commits touching a path, newest first.
    async fn commits_for_path(&self, path: &str) -> Result<CommitHistory, RemoteError>;
}
