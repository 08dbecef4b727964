//! adapter
//!
//! Storage-interface shim over [`RepositoryTree`].
//!
//! Exposes the usual filesystem adapter surface (`has`, `read`,
//! `list_contents`, metadata getters) for callers written against a
//! generic storage interface. Every mutating call fails with
//! [`TreeError::Unsupported`]; nothing is ever sent to the remote for it.
//!
//! # Example
//!
//! ```ignore
//! use hubtree::adapter::ReadOnlyAdapter;
//!
//! let adapter = ReadOnlyAdapter::new(tree);
//! if adapter.has("README.md").await? {
//!     let file = adapter.read("README.md").await?;
//!     println!("{} bytes", file.contents.len());
//! }
//! ```

use crate::core::paths::normalize_path;
use crate::core::types::{Metadata, TreeEntry, Visibility};
use crate::tree::{RepositoryTree, TreeError};

/// Contents of a file read through the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    pub path: String,
    pub contents: Vec<u8>,
}

/// Read-only storage adapter.
#[derive(Debug)]
pub struct ReadOnlyAdapter {
    tree: RepositoryTree,
}

impl ReadOnlyAdapter {
    pub fn new(tree: RepositoryTree) -> Self {
        Self { tree }
    }

    /// The wrapped facade.
    pub fn tree(&self) -> &RepositoryTree {
        &self.tree
    }

    pub async fn has(&self, path: &str) -> Result<bool, TreeError> {
        self.tree.exists(path).await
    }

    pub async fn read(&self, path: &str) -> Result<ReadResult, TreeError> {
        let contents = self.tree.get_file_contents(path).await?;
        Ok(ReadResult {
            path: normalize_path(path).to_string(),
            contents,
        })
    }

    pub async fn list_contents(
        &self,
        dir: &str,
        recursive: bool,
    ) -> Result<Vec<TreeEntry>, TreeError> {
        self.tree.get_directory_contents(dir, recursive).await
    }

    pub async fn get_metadata(&self, path: &str) -> Result<Metadata, TreeError> {
        self.tree.get_metadata(path).await
    }

    /// Size in bytes; `None` for directories and files the remote did not size.
    pub async fn get_size(&self, path: &str) -> Result<Option<u64>, TreeError> {
        match self.found(path).await? {
            Metadata::File(entry) => Ok(entry.size),
            _ => Ok(None),
        }
    }

    pub async fn get_mimetype(&self, path: &str) -> Result<&'static str, TreeError> {
        self.tree.guess_mime_type(path).await
    }

    /// Time of the newest commit touching the path.
    pub async fn get_timestamp(&self, path: &str) -> Result<i64, TreeError> {
        self.tree.get_last_updated_timestamp(path).await
    }

    pub async fn get_visibility(&self, path: &str) -> Result<Visibility, TreeError> {
        self.found(path)
            .await?
            .visibility()
            .ok_or_else(|| TreeError::NotFound(normalize_path(path).to_string()))
    }

    pub async fn write(&self, path: &str, _contents: &[u8]) -> Result<(), TreeError> {
        unsupported("write", path)
    }

    pub async fn update(&self, path: &str, _contents: &[u8]) -> Result<(), TreeError> {
        unsupported("update", path)
    }

    pub async fn rename(&self, path: &str, _new_path: &str) -> Result<(), TreeError> {
        unsupported("rename", path)
    }

    pub async fn copy(&self, path: &str, _new_path: &str) -> Result<(), TreeError> {
        unsupported("copy", path)
    }

    pub async fn delete(&self, path: &str) -> Result<(), TreeError> {
        unsupported("delete", path)
    }

    pub async fn delete_dir(&self, dir: &str) -> Result<(), TreeError> {
        unsupported("delete_dir", dir)
    }

    pub async fn create_dir(&self, dir: &str) -> Result<(), TreeError> {
        unsupported("create_dir", dir)
    }

    pub async fn set_visibility(
        &self,
        path: &str,
        _visibility: Visibility,
    ) -> Result<(), TreeError> {
        unsupported("set_visibility", path)
    }

    /// Metadata of a path that must exist.
    async fn found(&self, path: &str) -> Result<Metadata, TreeError> {
        match self.tree.get_metadata(path).await? {
            Metadata::NotFound => Err(TreeError::NotFound(normalize_path(path).to_string())),
            metadata => Ok(metadata),
        }
    }
}

fn unsupported(operation: &str, path: &str) -> Result<(), TreeError> {
    tracing::debug!(operation, path, "rejected mutating call");
    Err(TreeError::Unsupported(format!(
        "{} {}",
        operation,
        normalize_path(path)
    )))
}
