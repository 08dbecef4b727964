//! tree
//!
//! Read-only filesystem view of a hosted repository at one reference.
//!
//! # Architecture
//!
//! Calls flow one way:
//!
//! ```text
//! RepositoryTree -> filter -> normalize -> timestamp -> cache -> RemoteRepository
//! ```
//!
//! [`RepositoryTree`] is the only entry point. It owns two per-instance
//! caches (metadata by path, commit history by path) and never shares
//! them between instances.
//!
//! # Invariants
//!
//! - Paths are normalized before they reach the remote or a cache key
//! - A cached value is never replaced; a failed fetch is never cached
//! - A directory's timestamp is the max over its files, `0` when empty
//! - Entries of unknown raw type stay unknown
//!
//! # Modules
//!
//! - [`cache`]: fill-once, single-flight memoization
//! - [`normalize`]: raw entry to [`crate::core::types::TreeEntry`]
//! - [`filter`]: descendant selection on a flat listing
//! - [`timestamp`]: directory timestamp aggregation
//! - [`mime`]: MIME type guessing
//!
//! # Example
//!
//! ```ignore
//! use hubtree::core::config::Config;
//! use hubtree::tree::RepositoryTree;
//!
//! let config = Config::load()?;
//! let tree = RepositoryTree::from_settings(&config.settings)?;
//!
//! for entry in tree.get_directory_contents("src", false).await? {
//!     println!("{} {:?}", entry.path, entry.timestamp);
//! }
//! ```

pub mod cache;
mod error;
pub mod filter;
pub mod mime;
pub mod normalize;
mod repository;
pub mod timestamp;

pub use error::TreeError;
pub use repository::{RepositoryTree, TreeOptions};
