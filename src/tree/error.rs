//! tree::error
//!
//! Errors surfaced by the repository tree facade.

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors from tree operations.
///
/// A missing path is only an error for content reads; metadata lookups
/// report it as [`crate::core::types::Metadata::NotFound`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path does not exist at the reference.
    #[error("path not found: {0}")]
    NotFound(String),

    /// The path exists but no commit touches it, so it cannot be dated.
    #[error("no commit history for path: {0}")]
    NoCommitHistory(String),

    /// A committer date could not be parsed.
    #[error("invalid commit date '{value}' for path: {path}")]
    InvalidTimestamp { path: String, value: String },

    /// The operation would mutate the repository.
    #[error("not supported by a read-only repository: {0}")]
    Unsupported(String),

    /// Any other gateway failure, propagated unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl TreeError {
    /// Map a gateway `NotFound` onto [`TreeError::NotFound`] for `path`.
    pub fn from_remote(path: &str, err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(_) => TreeError::NotFound(path.to_string()),
            other => TreeError::Remote(other),
        }
    }
}
